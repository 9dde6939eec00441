use unicode_width::UnicodeWidthStr;

use crate::booking::{DashboardSummary, PriceQuote};
use crate::crm::insights::{AnalyticsReport, Insights, Trend};
use crate::crm::{initials, ScoreBand, TimelineEvent};
use crate::models::{Booking, Lead, Villa};
use crate::voice::{format_call_duration, AgentEvent, CallSession, SkipReason};

/// Format whole dollars with thousands separators: 15000 -> "$15,000".
pub fn format_money(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("${out}")
}

/// Truncate a string to fit within max_width (respecting unicode width).
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

pub fn print_villa_list(villas: &[&Villa]) {
    if villas.is_empty() {
        println!("No villas found.");
        return;
    }

    println!("{} villa{}:\n", villas.len(), plural(villas.len()));
    println!(
        "  {:<30} {:<24} {:>10} {:>6} {:<12}",
        "NAME", "LOCATION", "NIGHTLY", "GUESTS", "STATUS"
    );
    println!("  {}", "-".repeat(86));

    for v in villas {
        println!(
            "  {:<30} {:<24} {:>10} {:>6} {:<12}",
            truncate(&v.name, 28),
            truncate(&v.full_location(), 22),
            format_money(v.price_per_night),
            v.max_guests,
            v.status,
        );
        println!("  id: {}\n", v.id);
    }
}

pub fn print_villa_detail(v: &Villa, quote: Option<&PriceQuote>) {
    println!("Villa: {}", v.name);
    println!("  ID:        {}", v.id);
    println!("  Location:  {}", v.full_location());
    println!("  Nightly:   {}", format_money(v.price_per_night));
    println!(
        "  Sleeps:    {} guests, {} bed / {} bath",
        v.max_guests, v.bedrooms, v.bathrooms
    );
    println!("  Status:    {}", v.status);
    if !v.amenities.is_empty() {
        println!("  Amenities: {}", truncate(&v.amenities.join(", "), 72));
    }

    if !v.description.is_empty() {
        println!("\nDescription:");
        for line in v.description.lines() {
            println!("  {line}");
        }
    }

    if let Some(q) = quote {
        println!();
        print_quote(q);
    }
}

pub fn print_quote(q: &PriceQuote) {
    println!("Price ({} night{}):", q.nights, plural(q.nights as usize));
    println!(
        "  {:<22} {:>12}",
        format!("{} x {}", format_money(q.nightly_rate), q.nights),
        format_money(q.subtotal)
    );
    println!("  {:<22} {:>12}", "Service fee", format_money(q.service_fee));
    println!("  {:<22} {:>12}", "Taxes", format_money(q.taxes));
    println!("  {}", "-".repeat(35));
    println!("  {:<22} {:>12}", "Total", format_money(q.total));
}

pub fn print_booking_list(bookings: &[&Booking]) {
    if bookings.is_empty() {
        println!("No bookings found.");
        return;
    }

    println!("{} booking{}:\n", bookings.len(), plural(bookings.len()));
    println!(
        "  {:<22} {:<12} {:<12} {:>6} {:>10} {:<10} {:<8}",
        "GUEST", "CHECK-IN", "CHECK-OUT", "GUESTS", "AMOUNT", "STATUS", "PAYMENT"
    );
    println!("  {}", "-".repeat(86));

    for b in bookings {
        println!(
            "  {:<22} {:<12} {:<12} {:>6} {:>10} {:<10} {:<8}",
            truncate(&b.guest_name, 20),
            b.check_in,
            b.check_out,
            b.guests,
            format_money(b.total_amount),
            b.status,
            b.payment_status,
        );
        println!("  id: {}  villa: {}\n", b.id, b.villa_id);
    }
}

pub fn print_dashboard(d: &DashboardSummary) {
    println!("Dashboard:");
    println!("  Villas:          {} ({} active)", d.total_villas, d.active_villas);
    println!("  Bookings:        {} ({} pending)", d.total_bookings, d.pending_bookings);
    println!("  Revenue (paid):  {}", format_money(d.total_revenue));
    println!("  Occupancy:       {}%", d.occupancy_rate);
}

pub fn print_lead_list(leads: &[&Lead]) {
    if leads.is_empty() {
        println!("No leads found.");
        return;
    }

    println!("{} lead{}:\n", leads.len(), plural(leads.len()));
    println!(
        "  {:<4} {:<20} {:<30} {:<6} {:>5} {:>10}",
        "", "NAME", "INTEREST", "STATUS", "SCORE", "BUDGET"
    );
    println!("  {}", "-".repeat(80));

    for l in leads {
        println!(
            "  {:<4} {:<20} {:<30} {:<6} {:>5} {:>10}",
            initials(&l.name),
            truncate(&l.name, 18),
            truncate(&l.villa_interest, 28),
            l.status,
            l.score,
            format_money(l.budget),
        );
        println!(
            "       id: {}  {}  last contact {}\n",
            l.id,
            l.email,
            l.last_contact.format("%Y-%m-%d %H:%M")
        );
    }
}

pub fn print_lead_detail(l: &Lead, timeline: &[TimelineEvent]) {
    println!("Lead: {} ({})", l.name, l.id);
    println!("  Email:     {}", l.email);
    println!("  Phone:     {}", l.phone);
    println!("  Interest:  {}", l.villa_interest);
    println!("  Stay:      {} to {}, {} guests", l.check_in, l.check_out, l.guests);
    println!("  Budget:    {}", format_money(l.budget));
    println!("  Status:    {}", l.status);
    println!("  Score:     {} ({})", l.score, ScoreBand::of(l.score).as_str());
    println!("  Source:    {}", l.source);

    if !l.ai_summary.is_empty() {
        println!("\nAI Summary:");
        println!("  {}", l.ai_summary);
    }
    if !l.notes.is_empty() {
        println!("\nNotes:");
        for line in l.notes.lines() {
            println!("  {line}");
        }
    }

    println!("\nTimeline ({}):", timeline.len());
    for e in timeline {
        println!("  {}  {}", e.timestamp.format("%Y-%m-%d %H:%M"), e.title);
        println!("  {:<16}  {}", "", truncate(&e.description, 60));
    }
}

pub fn print_insights(i: &Insights) {
    println!("AI Insights:");
    println!("  Leads:      {}", i.total_leads);
    println!("  Hot:        {}", i.hot_leads);
    println!("  Avg score:  {:.1}", i.avg_score);

    println!("\n  Drop-off reasons:");
    for r in &i.drop_off_reasons {
        let arrow = match r.trend {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Stable => "→",
        };
        println!("    {:<24} {:>4} {:>4}% {arrow}", r.reason, r.count, r.percentage);
    }

    println!("\n  Conversion funnel:");
    for s in &i.conversion_funnel {
        println!("    {:<24} {:>4} {:>4}%", s.stage, s.count, s.percentage);
    }

    println!("\n  Predictions:");
    for p in &i.predictions {
        println!("    {} ({}% confidence)", p.title, p.confidence);
        println!("      {}", truncate(p.description, 72));
    }
}

pub fn print_analytics(r: &AnalyticsReport) {
    println!("Analytics:");
    if let Some(ref a) = r.summary {
        println!("  Total leads:        {}", a.total_leads);
        println!("  Conversion rate:    {:.1}%", a.conversion_rate);
        println!("  Avg response time:  {:.1} min", a.avg_response_time);
        println!("  Hot leads:          {}", a.hot_leads);
        println!("  Revenue pipeline:   {}", format_money(a.revenue_pipeline));
    }

    println!("\n  Conversion trend:");
    for m in &r.conversion_trend {
        println!("    {:<4} {:>5.1}%  {:>4} leads", m.month, m.rate, m.leads);
    }

    println!("\n  Response time by hour:");
    for h in &r.response_times {
        println!("    {:<5} {:>4.1} min", h.hour, h.minutes);
    }

    println!("\n  Channels:");
    for c in &r.channels {
        println!("    {:<12} {:>4} leads {:>5.1}%", c.channel, c.leads, c.conversion);
    }

    println!("\n  Lead sources:");
    for s in &r.lead_sources {
        println!("    {:<14} {:>3}%", s.name, s.percent);
    }
}

pub fn print_queue(leads: &[&Lead]) {
    if leads.is_empty() {
        println!("Call queue is empty.");
        return;
    }

    println!("Call queue ({}):", leads.len());
    for (n, l) in leads.iter().enumerate() {
        println!(
            "  {}. {:<20} {:<30} score {}",
            n + 1,
            truncate(&l.name, 18),
            truncate(&l.villa_interest, 28),
            l.score
        );
    }
}

/// One line per agent event, as printed by `villalux call`.
pub fn print_call_event(event: &AgentEvent) {
    match event {
        AgentEvent::Started { session_id, lead_id } => {
            println!("Calling lead {lead_id} ({session_id})");
        }
        AgentEvent::StatusChanged { status, .. } => println!("  [{status}]"),
        AgentEvent::Line { line, .. } => println!("  {line}"),
        AgentEvent::Tick { duration, .. } => {
            tracing::debug!("call time {}", format_call_duration(*duration));
        }
        AgentEvent::Completed(outcome) => {
            println!("Call with lead {} completed: {}", outcome.lead_id, outcome.outcome);
        }
        AgentEvent::Ended { lead_id, .. } => println!("Call with lead {lead_id} ended"),
        AgentEvent::Failed { lead_id, .. } => println!("Call with lead {lead_id} failed"),
        AgentEvent::AutoDialScheduled { lead_id, delay } => {
            println!("Next call to lead {lead_id} in {}s", delay.as_secs());
        }
        AgentEvent::AutoDialSkipped(reason) => match reason {
            SkipReason::Busy => println!("Auto-dial skipped: agent busy"),
            SkipReason::QueueEmpty => println!("Auto-dial skipped: queue empty"),
        },
    }
}

pub fn print_call_summary(s: &CallSession) {
    println!("\nCall {} ({}):", s.id, s.status);
    println!("  Lead:      {}", s.lead_id);
    println!("  Duration:  {}", format_call_duration(s.duration));
    println!("  Sentiment: {}", s.sentiment);
    if !s.key_points.is_empty() {
        println!("  Key points:");
        for p in &s.key_points {
            println!("    - {p}");
        }
    }
    if !s.next_action.is_empty() {
        println!("  Next:      {}", s.next_action);
    }
}
