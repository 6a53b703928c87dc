//! Background removal of expired hero images.
//!
//! Listing and uploading hero images sweep too, so the interval only bounds
//! how long an expired file lingers on disk when nobody visits the admin.

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::db::MediaRepository;
use crate::models::media::MediaKind;
use crate::services::gallery::HeroImages;
use crate::state::AppState;

/// Spawn the sweep loop. The first sweep runs immediately.
pub fn spawn(state: AppState) -> JoinHandle<()> {
    let period = state.config().hero_sweep_interval;
    info!(period_secs = period.as_secs(), "Spawning hero image sweeper");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&state).await;
        }
    })
}

async fn sweep_once(state: &AppState) {
    let hero = HeroImages::new(
        MediaRepository::new(state.pool(), MediaKind::Hero),
        state.uploads(),
    );
    match hero.sweep(Utc::now()).await {
        Ok(0) => debug!("No expired hero images"),
        Ok(removed) => info!(removed, "Removed expired hero images"),
        Err(e) => error!(error = %e, "Hero image sweep failed"),
    }
}
