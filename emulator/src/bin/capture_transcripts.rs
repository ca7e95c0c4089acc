use std::io;

#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use session::{Session, TranscriptProfile};

fn main() -> io::Result<()> {
    record_profile(TranscriptProfile::Interactive)?;
    record_profile(TranscriptProfile::SinglePress)?;
    record_profile(TranscriptProfile::Retrigger)?;
    Ok(())
}

fn record_profile(profile: TranscriptProfile) -> io::Result<()> {
    let mut session = Session::new(profile)?;
    match profile {
        TranscriptProfile::Interactive => record_tour(&mut session),
        TranscriptProfile::SinglePress => record_single_press(&mut session),
        TranscriptProfile::Retrigger => record_retrigger(&mut session),
    }
}

fn record_tour(session: &mut Session) -> io::Result<()> {
    let _ = session.handle_command("help")?;
    let _ = session.handle_command("dump")?;
    let _ = session.handle_command("status")?;
    let _ = session.handle_command("tap 80")?;
    let _ = session.handle_command("run 2500")?;
    let _ = session.handle_command("log 5")?;
    let _ = session.handle_command("status")?;
    Ok(())
}

fn record_single_press(session: &mut Session) -> io::Result<()> {
    let _ = session.handle_command("press")?;
    let _ = session.handle_command("run 200")?;
    let _ = session.handle_command("status")?;
    let _ = session.handle_command("release")?;
    let _ = session.handle_command("run 2s")?;
    let _ = session.handle_command("log")?;
    Ok(())
}

fn record_retrigger(session: &mut Session) -> io::Result<()> {
    let _ = session.handle_command("tap 100")?;
    let _ = session.handle_command("run 500")?;
    let _ = session.handle_command("tap 100")?;
    let _ = session.handle_command("run 2s")?;
    let _ = session.handle_command("log")?;
    Ok(())
}
