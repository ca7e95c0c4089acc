use embassy_time::{Duration, Instant, Ticker};

use fixture_core::clock::TickInstant;
use fixture_core::generator::Phase;

use super::FixtureOrchestrator;
use crate::status;

/// One tick of sequence time per poll.
const POLL_PERIOD: Duration = Duration::from_millis(1);

/// Wall-clock milliseconds folded into the core's wrapping tick domain.
#[allow(clippy::cast_possible_truncation)] // sequence time is u32 milliseconds, modulo 2^32
pub(super) fn now_ticks() -> TickInstant {
    TickInstant::from_ticks(Instant::now().as_millis() as u32)
}

#[embassy_executor::task]
pub async fn run(mut orchestrator: FixtureOrchestrator) -> ! {
    let mut ticker = Ticker::every(POLL_PERIOD);

    loop {
        ticker.next().await;
        let now = now_ticks();

        let report = orchestrator.poll(now);
        status::record_poll();

        if let Some(edge) = report.edge {
            status::record_edge(now);
            status::record_input_active(orchestrator.input_level().is_high());
            defmt::info!(
                "input edge: {} at {}",
                defmt::Display2Format(&edge),
                defmt::Display2Format(&now)
            );
        }

        for id in &report.triggered {
            defmt::info!("trigger accepted: {=str}", id.name());
        }

        for transition in &report.transitions {
            let active = matches!(transition.phase, Phase::Active);
            status::record_output_active(transition.output, active);
            defmt::info!(
                "output {=str}: {}",
                transition.output.name(),
                defmt::Display2Format(&transition.phase)
            );
        }
    }
}
