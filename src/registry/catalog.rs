//! Built-in permission catalog (Chrome MV2/MV3 manifest schema plus the
//! broad host match patterns).

use std::collections::BTreeSet;

use super::Category::{self, Functionality as F, Privacy as P, Security as S};
use super::ImpactType::{self, *};
use super::PermissionDescriptor;
use super::RiskTier::{self, *};

pub(crate) const PERMISSIONS_LIST_URL: &str =
    "https://developer.chrome.com/docs/extensions/reference/permissions-list";
pub(crate) const MATCH_PATTERNS_URL: &str =
    "https://developer.chrome.com/docs/extensions/develop/concepts/match-patterns";

struct Entry {
    id: &'static str,
    tier: RiskTier,
    points: f64,
    impact: ImpactType,
    categories: &'static [Category],
    description: &'static str,
}

const fn e(
    id: &'static str,
    tier: RiskTier,
    points: f64,
    impact: ImpactType,
    categories: &'static [Category],
    description: &'static str,
) -> Entry {
    Entry {
        id,
        tier,
        points,
        impact,
        categories,
        description,
    }
}

#[rustfmt::skip]
const CATALOG: &[Entry] = &[
    // Host access
    e("<all_urls>", Critical, 35.0, DataAccess, &[S, P], "Read and change all data on every website"),
    e("*://*/*", Critical, 35.0, DataAccess, &[S, P], "Read and change all data on every http(s) website"),
    e("https://*/*", Critical, 32.0, DataAccess, &[S, P], "Read and change all data on every https website"),
    e("http://*/*", Critical, 30.0, DataAccess, &[S, P], "Read and change all data on every http website"),
    e("file:///*", High, 25.0, DataAccess, &[S, P], "Read local files opened in the browser"),

    // Critical
    e("debugger", Critical, 40.0, DevelopmentTools, &[S, P], "Attach the debugger protocol to any tab"),
    e("nativeMessaging", Critical, 38.0, SystemInteraction, &[S], "Exchange messages with native applications"),
    e("proxy", Critical, 34.0, NetworkControl, &[S, P], "Route all browser traffic through a proxy"),
    e("userScripts", Critical, 32.0, CodeInjection, &[S], "Register arbitrary user scripts"),
    e("webAuthenticationProxy", Critical, 32.0, AccountAccess, &[S], "Intercept Web Authentication requests"),
    e("scripting", Critical, 30.0, CodeInjection, &[S], "Inject scripts and styles into pages"),
    e("webRequestBlocking", Critical, 30.0, NetworkControl, &[S, P], "Block or modify network requests in flight"),

    // High
    e("desktopCapture", High, 28.0, PrivacySensitive, &[P], "Capture screen, window or tab content"),
    e("cookies", High, 26.0, AccountAccess, &[S, P], "Read and modify cookies, including session tokens"),
    e("management", High, 26.0, SystemInteraction, &[S], "Manage other installed extensions"),
    e("vpnProvider", High, 26.0, NetworkControl, &[S, P], "Implement a VPN client"),
    e("webRequest", High, 25.0, NetworkControl, &[S, P], "Observe and analyze network traffic"),
    e("history", High, 24.0, PrivacySensitive, &[P], "Read and change browsing history"),
    e("tabCapture", High, 24.0, PrivacySensitive, &[P], "Capture audio and video of tabs"),
    e("certificateProvider", High, 24.0, SecurityFeature, &[S], "Expose client certificates to the platform"),
    e("webRequestAuthProvider", High, 24.0, AccountAccess, &[S], "Supply credentials for HTTP auth challenges"),
    e("clipboardRead", High, 22.0, DataAccess, &[P], "Read clipboard contents"),
    e("pageCapture", High, 22.0, DataAccess, &[P], "Save full pages as MHTML"),
    e("geolocation", High, 22.0, PrivacySensitive, &[P], "Access the device location"),
    e("identity", High, 22.0, AccountAccess, &[S, P], "Obtain OAuth2 tokens for the signed-in user"),
    e("privacy", High, 22.0, BrowserControl, &[S, P], "Change browser privacy settings"),
    e("platformKeys", High, 22.0, SecurityFeature, &[S], "Use platform-managed client certificates"),
    e("enterprise.platformKeys", High, 22.0, SecurityFeature, &[S], "Generate and use enterprise keys"),
    e("tabs", High, 20.0, DataAccess, &[P], "Read URLs and titles of all tabs"),
    e("webNavigation", High, 20.0, PrivacySensitive, &[P], "Observe navigation events in every tab"),
    e("contentSettings", High, 20.0, BrowserControl, &[S, P], "Change per-site content settings"),
    e("browsingData", High, 20.0, DataAccess, &[P], "Remove browsing data"),
    e("downloads.open", High, 20.0, SystemInteraction, &[S], "Open downloaded files"),
    e("experimental", High, 20.0, DevelopmentTools, &[S], "Use experimental extension APIs"),

    // Moderate
    e("identity.email", Moderate, 16.0, AccountAccess, &[P], "Read the signed-in user's email address"),
    e("declarativeNetRequestWithHostAccess", Moderate, 16.0, NetworkControl, &[S, P], "Rule-based request modification with host access"),
    e("fileSystemProvider", Moderate, 16.0, SystemInteraction, &[S], "Provide file systems to the OS"),
    e("downloads", Moderate, 14.0, DataTransfer, &[S], "Start and manage downloads"),
    e("bookmarks", Moderate, 14.0, DataAccess, &[P], "Read and change bookmarks"),
    e("sessions", Moderate, 14.0, PrivacySensitive, &[P], "Read recently closed tabs and synced devices"),
    e("processes", Moderate, 14.0, SystemInteraction, &[S], "Inspect browser processes"),
    e("documentScan", Moderate, 14.0, SystemInteraction, &[P], "Access attached document scanners"),
    e("declarativeNetRequestFeedback", Moderate, 14.0, PrivacySensitive, &[P], "See which request rules matched"),
    e("declarativeNetRequest", Moderate, 12.0, NetworkControl, &[S], "Block or modify requests with declarative rules"),
    e("topSites", Moderate, 12.0, PrivacySensitive, &[P], "Read most visited sites"),
    e("fileBrowserHandler", Moderate, 12.0, SystemInteraction, &[S], "Handle files from the OS file browser"),
    e("accessibilityFeatures.modify", Moderate, 12.0, BrowserControl, &[S], "Change accessibility settings"),
    e("enterprise.deviceAttributes", Moderate, 12.0, DataAccess, &[P], "Read enterprise device attributes"),
    e("enterprise.networkingAttributes", Moderate, 12.0, DataAccess, &[P], "Read enterprise network details"),
    e("dns", Moderate, 10.0, NetworkControl, &[P], "Resolve host names"),
    e("readingList", Moderate, 10.0, DataAccess, &[P], "Read and change the reading list"),
    e("clipboardWrite", Moderate, 10.0, DataTransfer, &[S], "Write to the clipboard"),
    e("system.storage", Moderate, 10.0, SystemInteraction, &[P], "Inspect attached storage devices"),
    e("printerProvider", Moderate, 10.0, SystemInteraction, &[F], "Expose printers to the browser"),
    e("printingMetrics", Moderate, 10.0, DataAccess, &[P], "Read printing history"),
    e("enterprise.hardwarePlatform", Moderate, 10.0, DataAccess, &[P], "Read hardware manufacturer and model"),
    e("printing", Moderate, 8.0, SystemInteraction, &[F], "Submit print jobs"),
    e("loginState", Moderate, 8.0, AccountAccess, &[P], "Read the login state"),
    e("background", Moderate, 8.0, Functionality, &[F], "Keep running in the background"),
    e("accessibilityFeatures.read", Moderate, 8.0, DataAccess, &[P], "Read accessibility settings"),
    e("audio", Moderate, 8.0, SystemInteraction, &[F], "Control audio devices"),

    // Low
    e("activeTab", Low, 6.0, BrowserControl, &[P], "Temporary access to the current tab on user gesture"),
    e("ttsEngine", Low, 6.0, UiInteraction, &[F], "Implement a text-to-speech engine"),
    e("storage", Low, 5.0, Functionality, &[F], "Store extension data"),
    e("gcm", Low, 5.0, DataTransfer, &[F], "Receive push messages"),
    e("declarativeContent", Low, 4.0, UiInteraction, &[F], "Show actions based on page content"),
    e("downloads.ui", Low, 4.0, UiInteraction, &[F], "Change the downloads shelf"),
    e("notifications", Low, 4.0, UiInteraction, &[F], "Show system notifications"),
    e("offscreen", Low, 4.0, Functionality, &[F], "Create offscreen documents"),
    e("search", Low, 4.0, BrowserControl, &[F], "Search with the default provider"),
    e("tabGroups", Low, 4.0, UiInteraction, &[F], "Organize tabs into groups"),
    e("unlimitedStorage", Low, 3.0, Functionality, &[F], "Exceed the storage quota"),
    e("idle", Low, 3.0, Functionality, &[F], "Detect machine idle state"),
    e("contextMenus", Low, 3.0, UiInteraction, &[F], "Add context menu items"),
    e("power", Low, 3.0, Functionality, &[F], "Keep the system awake"),
    e("system.cpu", Low, 3.0, Functionality, &[F], "Read CPU metadata"),
    e("system.memory", Low, 3.0, Functionality, &[F], "Read memory capacity"),
    e("system.display", Low, 3.0, Functionality, &[F], "Read display metadata"),
    e("wallpaper", Low, 3.0, Functionality, &[F], "Change the wallpaper"),
    e("alarms", Low, 2.0, Functionality, &[F], "Schedule periodic work"),
    e("fontSettings", Low, 2.0, Functionality, &[F], "Manage font settings"),
    e("tts", Low, 2.0, UiInteraction, &[F], "Speak text"),
    e("sidePanel", Low, 2.0, UiInteraction, &[F], "Show content in the side panel"),
    e("favicon", Low, 2.0, Functionality, &[F], "Read site favicons"),
    e("runtime", Low, 2.0, Functionality, &[F], "Access runtime extras"),
];

fn documentation_link(id: &str) -> String {
    if id.starts_with('<') || id.contains("://") {
        MATCH_PATTERNS_URL.into()
    } else {
        format!("{PERMISSIONS_LIST_URL}#{}", id.to_lowercase())
    }
}

pub(crate) fn descriptors() -> impl Iterator<Item = PermissionDescriptor> {
    CATALOG.iter().map(|entry| PermissionDescriptor {
        id: entry.id.into(),
        risk_tier: entry.tier,
        base_risk_points: entry.points,
        impact_type: entry.impact,
        categories: entry.categories.iter().copied().collect::<BTreeSet<_>>(),
        description: entry.description.into(),
        documentation_link: documentation_link(entry.id),
    })
}
