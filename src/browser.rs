use tracing::{info, warn};

/// Opens a URL somewhere the user can see it.
pub trait Launcher {
    fn launch(&self, url: &str);
}

/// The user's default browser. Fire and forget: the spawned browser is not
/// tracked and its failures are only logged.
pub struct SystemBrowser;

impl Launcher for SystemBrowser {
    fn launch(&self, url: &str) {
        info!(%url, "Opening in browser");
        if let Err(e) = open::that_detached(url) {
            warn!(error = %e, %url, "Could not start browser");
        }
    }
}
