//! Symbolic link capability, resolved once per process

use crate::config::{LinksConfig, SymlinkPolicy};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};

static LINK_CAPABILITY: OnceCell<LinkCapability> = OnceCell::new();

#[derive(Debug)]
pub struct LinkCapability {
    symlinks: bool,
    allow_unprivileged: AtomicBool,
}

impl LinkCapability {
    pub fn from_config(config: &LinksConfig) -> Self {
        Self {
            symlinks: config.symlinks == SymlinkPolicy::Auto,
            allow_unprivileged: AtomicBool::new(config.allow_unprivileged),
        }
    }

    pub fn symlinks(&self) -> bool {
        self.symlinks
    }

    pub fn allow_unprivileged(&self) -> bool {
        self.allow_unprivileged.load(Ordering::Relaxed)
    }

    /// Stop requesting unprivileged creation for the rest of the process
    pub fn revoke_unprivileged(&self) {
        if self.allow_unprivileged.swap(false, Ordering::Relaxed) {
            tracing::info!("Unprivileged symbolic link creation not supported, disabled");
        }
    }
}

/// Install the capability derived from `config`.
/// Later calls keep the first value.
pub fn install(config: &LinksConfig) -> &'static LinkCapability {
    let capability = LINK_CAPABILITY.get_or_init(|| LinkCapability::from_config(config));
    tracing::debug!(
        "Link capability: symlinks={}, unprivileged={}",
        capability.symlinks(),
        capability.allow_unprivileged()
    );
    capability
}

/// Current capability, defaulting to the stock configuration
pub fn current() -> &'static LinkCapability {
    LINK_CAPABILITY.get_or_init(|| LinkCapability::from_config(&LinksConfig::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_policy() {
        let capability = LinkCapability::from_config(&LinksConfig {
            symlinks: SymlinkPolicy::Disabled,
            allow_unprivileged: true,
        });
        assert!(!capability.symlinks());
    }

    #[test]
    fn test_revoke_unprivileged() {
        let capability = LinkCapability::from_config(&LinksConfig::default());
        assert!(capability.allow_unprivileged());
        capability.revoke_unprivileged();
        assert!(!capability.allow_unprivileged());
    }
}
