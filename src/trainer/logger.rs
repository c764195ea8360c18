use std::{
    fmt::Display,
    io::{stdout, Write},
    time::Instant,
};

pub fn ansi<T: Display, U: Display>(x: T, y: U) -> String {
    format!("\x1b[{y}m{x}\x1b[0m")
}

pub fn report_batch_progress(
    id: &str,
    epoch: usize,
    finished_batches: usize,
    batches: usize,
    running_loss: f32,
    epoch_timer: &Instant,
    batch_size: usize,
) {
    let positions = finished_batches * batch_size;
    let pos_per_sec = positions as f32 / epoch_timer.elapsed().as_secs_f32().max(f32::EPSILON);

    print!(
        "{id} epoch {} batch {}/{} running loss {} ({} pos/sec)\r",
        ansi(epoch, 36),
        ansi(finished_batches, 36),
        ansi(batches, 36),
        ansi(format!("{running_loss:.6}"), 36),
        ansi(format!("{pos_per_sec:.0}"), 36),
    );
    let _ = stdout().flush();
}

pub fn report_epoch_finished(id: &str, epoch: usize, running_loss: f32, epoch_timer: &Instant, timer: &Instant) {
    println!(
        "{id} epoch {} | time {}s | mean batch loss {} | total time {}s",
        ansi(epoch, 36),
        ansi(format!("{:.1}", epoch_timer.elapsed().as_secs_f32()), 36),
        ansi(format!("{running_loss:.6}"), 36),
        ansi(timer.elapsed().as_secs(), 36),
    );
}

pub fn report_dataset_loss(id: &str, epoch: usize, loss: f32, new_best: bool) {
    let marker = if new_best { ansi(" ***", "32;1") } else { String::new() };
    println!("{id} dataset loss after {} epochs: {}{marker}", ansi(epoch, 36), ansi(format!("{loss:.6}"), "33;1"));
}
