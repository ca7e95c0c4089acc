use embassy_time::{Duration, Ticker};

use crate::status;

const HEARTBEAT_PERIOD: Duration = Duration::from_secs(1);

#[embassy_executor::task]
pub async fn run() -> ! {
    let mut ticker = Ticker::every(HEARTBEAT_PERIOD);

    loop {
        ticker.next().await;
        let snapshot = status::snapshot();
        defmt::info!(
            "heartbeat: polls={=u32} services={=u32} input-active={=bool} outputs-active={} last-edge-tick={}",
            snapshot.polls,
            snapshot.watchdog_services,
            snapshot.input_active,
            snapshot.active,
            snapshot.last_edge_ticks,
        );
    }
}
