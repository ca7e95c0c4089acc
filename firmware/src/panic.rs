use core::panic::PanicInfo;
use defmt::error;

// A panic halts the poll loop, so the IWDG goes unserviced and resets the
// MCU; boot then drives every effect output back to its idle level before
// anything else can happen.
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    error!("PANIC: {}", defmt::Display2Format(info));
    cortex_m::asm::udf();
}
