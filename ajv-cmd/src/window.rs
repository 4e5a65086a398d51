//! Print the calendar window around a center day.

use ajv_core::calendar_window::build_window;

pub fn run_window(center: &str, days: usize, json: bool) -> anyhow::Result<()> {
    let window = build_window(center, days)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&window.labels())?);
    } else {
        for (day, offset) in window.days.iter().zip(-((window.len() / 2) as i32)..) {
            println!("{:>+4}  {}", offset, day);
        }
    }
    Ok(())
}
