// Host stand-in for a super-loop firmware
//
// Two LEDs on "C.." at 1s per step: red forever, green for 3 cycles.
// The tick source is wall-clock milliseconds since start, truncated to
// u32 like a HAL_GetTick()/millis() would be.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use callpattern::{DefaultScheduler, RoutineConfig, SchedulerError};
use log::{LevelFilter, Log, Metadata, Record};

struct StderrLog;

impl Log for StderrLog {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        eprintln!("[{:<5}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StderrLog = StderrLog;

static RED: AtomicBool = AtomicBool::new(false);
static GREEN: AtomicBool = AtomicBool::new(false);

fn toggle(led: &AtomicBool, name: &str, start: Instant) {
    let on = !led.fetch_xor(true, Ordering::Relaxed);
    println!(
        "{:>6} ms - {} led {}",
        start.elapsed().as_millis(),
        name,
        if on { "on" } else { "off" }
    );
}

fn main() -> Result<(), SchedulerError> {
    log::set_logger(&LOGGER).ok();
    log::set_max_level(LevelFilter::Debug);

    let start = Instant::now();
    let mut red = || toggle(&RED, "red", start);
    let mut green = || toggle(&GREEN, "green", start);

    let mut sched = DefaultScheduler::new();
    sched.create(RoutineConfig::new("red led", "C..", 1000, &mut red))?;
    sched.create(RoutineConfig::new("green led", "C..", 1000, &mut green))?;

    sched.start_for_n_cycles("green led", 3)?;
    sched.start_infinite("red led")?;

    let tick = || start.elapsed().as_millis() as u32;
    while start.elapsed() < Duration::from_secs(15) {
        sched.poll(tick);
        std::thread::sleep(Duration::from_millis(1));
    }

    sched.stop("red led")?;
    sched.clear_all();
    Ok(())
}
