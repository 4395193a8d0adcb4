//! In-process loopback demo: two links wired back to back, driven by a
//! simulated clock one tick per `send_min_interval`.

use std::time::{Duration, Instant};

use synclink_peer::{Link, LinkConfig, SharedStateMap};

use crate::cmd::DemoArgs;
use crate::exit::{link_error, CliError, CliResult, SUCCESS, USAGE};
use crate::segments::{
    self, AlarmLimitsRequest, Kind, ParametersRequest, ScreenStatusRequest, Segment, SCHEDULE,
};

type DemoLink = Link<Kind, Segment, SharedStateMap<Kind, Segment>, SharedStateMap<Kind, Segment>>;

struct Endpoint {
    name: &'static str,
    link: DemoLink,
    local: SharedStateMap<Kind, Segment>,
    peer_view: SharedStateMap<Kind, Segment>,
}

fn endpoint(name: &'static str, config: LinkConfig<Kind>) -> CliResult<Endpoint> {
    let registry = segments::registry().map_err(|err| link_error(name, err.into()))?;
    let local = SharedStateMap::new();
    let peer_view = SharedStateMap::new();
    let link = Link::new(registry, local.clone(), peer_view.clone(), config)
        .map_err(|err| link_error(name, err))?;
    Ok(Endpoint {
        name,
        link,
        local,
        peer_view,
    })
}

fn seed(store: &SharedStateMap<Kind, Segment>) {
    store.set(
        Kind::ParametersRequest,
        Segment::Parameters(ParametersRequest { fio2: 21, flow: 30 }),
    );
    store.set(
        Kind::AlarmLimitsRequest,
        Segment::AlarmLimits(AlarmLimitsRequest {
            fio2_min: 21,
            fio2_max: 80,
        }),
    );
    store.set(
        Kind::ScreenStatusRequest,
        Segment::ScreenStatus(ScreenStatusRequest { locked: false }),
    );
}

fn deliver(from: &mut Endpoint, to: &mut Endpoint, now: Instant, dropped: bool) {
    let Some(frame) = from.link.poll_send() else {
        return;
    };
    if dropped {
        tracing::debug!(from = from.name, len = frame.len(), "frame dropped (outage)");
        return;
    }
    tracing::info!(
        from = from.name,
        to = to.name,
        tag = frame[0],
        len = frame.len(),
        "frame delivered"
    );
    to.link.on_frame(&frame, now);
}

pub fn run(args: DemoArgs) -> CliResult<i32> {
    if args.outage_ticks >= args.ticks {
        return Err(CliError::new(
            USAGE,
            "outage-ticks must be smaller than ticks",
        ));
    }

    let mut config = LinkConfig::new(SCHEDULE.to_vec());
    config.send_min_interval = Duration::from_millis(args.min_interval_ms);
    config.send_max_interval = Duration::from_millis(args.max_interval_ms);
    config.connection_timeout = Duration::from_millis(args.timeout_ms);
    config.output_idle = args.output_idle;

    let mut a = endpoint("a", config.clone())?;
    let mut b = endpoint("b", config)?;
    seed(&a.local);
    seed(&b.local);

    // Scripted change partway through, so the event schedule has work to do.
    let change_at = args.ticks / 3;
    // Optional outage window in the middle third.
    let outage = change_at + 1..change_at + 1 + args.outage_ticks;

    let tick = Duration::from_millis(args.min_interval_ms);
    let mut now = Instant::now();
    for step in 0..args.ticks {
        now += tick;
        if step == change_at {
            tracing::info!("operator raises fio2 on endpoint a");
            a.local.set(
                Kind::ParametersRequest,
                Segment::Parameters(ParametersRequest { fio2: 60, flow: 40 }),
            );
        }

        let dropped = outage.contains(&step);
        deliver(&mut a, &mut b, now, dropped);
        deliver(&mut b, &mut a, now, dropped);
        if a.link.check_timeout(now) {
            tracing::warn!(endpoint = a.name, "link down");
        }
        if b.link.check_timeout(now) {
            tracing::warn!(endpoint = b.name, "link down");
        }
    }

    let mut converged = true;
    for kind in SCHEDULE {
        let sent = a.local.get(&kind);
        let seen = b.peer_view.get(&kind);
        let matched = sent == seen;
        converged &= matched;
        println!(
            "{kind:?}: {}",
            if matched { "in sync" } else { "diverged" }
        );
    }
    println!(
        "link a: {}, link b: {}",
        if a.link.connection_up() { "up" } else { "down" },
        if b.link.connection_up() { "up" } else { "down" },
    );

    if converged {
        Ok(SUCCESS)
    } else {
        Ok(1)
    }
}
