use crate::infra::{parse_date, sample_catalog};
use chrono::{Duration, Local, NaiveDate, Utc};
use clap::Args;
use std::sync::Arc;
use tour_booking::booking::{
    BookingError, BookingLifecycleService, BookingRequest, BookingStatus, DashboardReport,
    InMemoryBookingStore, ManualClock, NewBookingRequest, ProductId,
};
use tour_booking::config::BookingConfig;
use tour_booking::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Tour date requested by the sample customers (YYYY-MM-DD). Defaults to two weeks out.
    #[arg(long, value_parser = parse_date)]
    pub(crate) tour_date: Option<NaiveDate>,
    /// Dashboard lookback in days.
    #[arg(long, default_value_t = 30)]
    pub(crate) days: u32,
    /// Print the dashboard as JSON instead of a table.
    #[arg(long)]
    pub(crate) json: bool,
}

struct Scenario {
    product: &'static str,
    name: &'static str,
    phone: &'static str,
    adults: u32,
    children: u32,
    steps: &'static [(BookingStatus, &'static str)],
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        product: "jeju-olle-7",
        name: "Kim Taehyung",
        phone: "010-3000-0001",
        adults: 2,
        children: 1,
        steps: &[
            (BookingStatus::Inquiring, "confirmed guide availability"),
            (BookingStatus::PendingPayment, "invoice sent"),
            (BookingStatus::Paid, "bank transfer received"),
            (BookingStatus::Confirmed, "pickup scheduled"),
        ],
    },
    Scenario {
        product: "jeju-udo-bike",
        name: "Han Sora",
        phone: "010-3000-0002",
        adults: 1,
        children: 0,
        steps: &[
            (BookingStatus::Inquiring, "asked about rain policy"),
            (BookingStatus::PendingPayment, "invoice sent"),
            (BookingStatus::Cancelled, "customer changed plans"),
        ],
    },
    Scenario {
        product: "seoul-hanok",
        name: "Oh Jiwon",
        phone: "010-3000-0003",
        adults: 4,
        children: 0,
        steps: &[(BookingStatus::Rejected, "no guide for that date")],
    },
    Scenario {
        product: "seoul-hanok",
        name: "Yoon Mirae",
        phone: "010-3000-0004",
        adults: 1,
        children: 2,
        steps: &[],
    },
];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        tour_date,
        days,
        json,
    } = args;

    let tour_date = tour_date.unwrap_or_else(|| Local::now().date_naive() + Duration::days(14));
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let store = Arc::new(InMemoryBookingStore::with_products(sample_catalog()));
    let service =
        BookingLifecycleService::with_clock(store, clock.clone(), BookingConfig::default());

    println!("Tour booking lifecycle demo (tour date {tour_date})");
    for scenario in SCENARIOS {
        let request = play(&service, &clock, scenario, tour_date)?;
        println!(
            "\n{} · {} · {} adult(s), {} child(ren) · {} {}",
            request.id,
            request.product_id,
            request.adult_count,
            request.child_count,
            request.total_amount,
            request.currency.code()
        );
        for log in service.logs(&request.id)?.iter().rev() {
            println!(
                "  {} → {}  {}",
                log.previous_status,
                log.new_status,
                log.note.as_deref().unwrap_or("")
            );
        }
        println!("  status: {}", request.status);
    }

    let fresh = service.by_phone("010-3000-0004")?;
    if let Some(request) = fresh.first() {
        if let Err(err) = service.cancel(&request.id, None) {
            println!("\nCancelling a brand-new request is refused: {err}");
        }
    }

    let report = service.dashboard(None, Some(days))?;
    if json {
        let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
        println!("\n{rendered}");
    } else {
        render_dashboard(&report);
    }

    Ok(())
}

fn play<S>(
    service: &BookingLifecycleService<S>,
    clock: &ManualClock,
    scenario: &Scenario,
    tour_date: NaiveDate,
) -> Result<BookingRequest, BookingError>
where
    S: tour_booking::booking::BookingStore + 'static,
{
    let mut request = service.create(NewBookingRequest {
        product_id: ProductId::from(scenario.product),
        requester_name: scenario.name.to_string(),
        phone: scenario.phone.to_string(),
        requested_date: tour_date,
        adult_count: scenario.adults,
        child_count: Some(scenario.children),
        email: None,
        chat_identity: None,
        special_request: None,
        pickup_location: None,
    })?;

    for (status, note) in scenario.steps {
        clock.advance(Duration::minutes(45));
        request = service.transition(&request.id, *status, Some(note.to_string()))?;
    }
    Ok(request)
}

fn render_dashboard(report: &DashboardReport) {
    let stats = &report.stats;
    println!(
        "\nDashboard (last {} days, since {})",
        report.window_days,
        report.window_start.format("%Y-%m-%d %H:%M UTC")
    );
    println!("  total requests     {:>10}", stats.total_requests);
    println!("  new                {:>10}", stats.new_requests);
    println!("  confirmed          {:>10}", stats.confirmed_requests);
    println!("  cancelled          {:>10}", stats.cancelled_requests);
    println!("  revenue (KRW)      {:>10}", stats.total_revenue);
    println!("  avg booking (KRW)  {:>10}", stats.average_booking_value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenarios_follow_the_transition_table() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = Arc::new(InMemoryBookingStore::with_products(sample_catalog()));
        let service =
            BookingLifecycleService::with_clock(store, clock.clone(), BookingConfig::default());
        let tour_date = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();

        let outcomes: Vec<_> = SCENARIOS
            .iter()
            .map(|scenario| play(&service, &clock, scenario, tour_date).expect("scenario plays"))
            .map(|request| request.status)
            .collect();

        assert_eq!(
            outcomes,
            vec![
                BookingStatus::Confirmed,
                BookingStatus::Cancelled,
                BookingStatus::Rejected,
                BookingStatus::New,
            ]
        );

        let stats = service.dashboard(None, None).unwrap().stats;
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.total_revenue, 25_000);
    }

    #[test]
    fn demo_runs_end_to_end() {
        run_demo(DemoArgs {
            tour_date: NaiveDate::from_ymd_opt(2025, 11, 20),
            days: 7,
            json: true,
        })
        .expect("demo completes");
    }
}
