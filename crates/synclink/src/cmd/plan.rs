use std::time::Duration;

use synclink_sched::ScheduleConfig;

use crate::cmd::PlanArgs;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::segments::SCHEDULE;

pub fn run(args: PlanArgs) -> CliResult<i32> {
    let mut config = ScheduleConfig::new(SCHEDULE.to_vec());
    config.send_min_interval = Duration::from_millis(args.min_interval_ms);
    config.send_max_interval = Duration::from_millis(args.max_interval_ms);
    config
        .validate()
        .map_err(|err| CliError::new(USAGE, err.to_string()))?;

    let ratio = config.slot_ratio();
    println!(
        "tick: {}ms, full-sync bound: {}ms",
        args.min_interval_ms, args.max_interval_ms
    );
    println!("slots per rotation: {ratio}");

    let mut slots = vec!["main"];
    slots.extend(std::iter::repeat("event").take(ratio - 1));
    println!("rotation: {}", slots.join(" "));

    println!("main slot order:");
    for index in &config.schedule {
        println!("  {index:?}");
    }

    Ok(SUCCESS)
}
