//! Command implementations and plain-text rendering.

use anyhow::{Context as _, Result, bail};
use chrono::{NaiveDate, Utc};
use deskline_core::{
  attendance::WeekTable,
  week::{DEFAULT_MAX_WFH_DAYS, validate_wfh_days, week_start_of},
};

use crate::App;

/// Normalise an optional date to the Monday of its week, defaulting to
/// the current week.
fn resolve_week_start(start: Option<NaiveDate>) -> NaiveDate {
  week_start_of(start.unwrap_or_else(|| Utc::now().date_naive()))
}

// ─── Auth ─────────────────────────────────────────────────────────────────────

pub async fn login(app: &App, email: Option<String>) -> Result<()> {
  let email = email
    .or_else(|| app.email.clone())
    .context("no email given (use --email or set it in the config file)")?;
  let password = match std::env::var("DESKLINE_PASSWORD") {
    Ok(p) if !p.is_empty() => p,
    _ => prompt_password()?,
  };

  let session = app.session.sign_in_with_password(&email, &password).await?;
  println!("signed in as {}", session.user.email);

  match app.session.fetch_profile().await? {
    Some(profile) => println!("welcome back, {}", profile.full_name),
    None => println!("no profile yet; one will be created on first save"),
  }
  Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
  app.session.sign_out().await?;
  println!("signed out");
  Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
  let user = app.session.current_user().await?;
  println!("{}  ({})", user.email, user.id);
  if let Some(profile) = app.session.fetch_profile().await? {
    println!("name:       {}", profile.full_name);
    if let Some(department) = profile.department {
      println!("department: {department}");
    }
    if let Some(role) = profile.role {
      println!("role:       {role}");
    }
  }
  Ok(())
}

// ─── Schedules ────────────────────────────────────────────────────────────────

pub async fn week(app: &App, start: Option<NaiveDate>) -> Result<()> {
  let week_start = resolve_week_start(start);
  let table = app.schedule.weekly_office_status(week_start).await?;
  render_week(&table);
  Ok(())
}

pub async fn save(
  app: &App,
  days: &[u8],
  start: Option<NaiveDate>,
) -> Result<()> {
  validate_wfh_days(days, DEFAULT_MAX_WFH_DAYS)?;

  let week_start = resolve_week_start(start);
  let weekly = app.schedule.save_weekly_schedule(week_start, days).await?;
  println!(
    "saved week {} / {} ({} WFH {})",
    weekly.year,
    weekly.week_number,
    weekly.wfh_days.len(),
    if weekly.wfh_days.len() == 1 { "day" } else { "days" },
  );
  Ok(())
}

fn render_week(table: &WeekTable) {
  print!("{:<24}", "member");
  for day in &table.week_days {
    print!("{:>5}", day.day_short);
  }
  println!("{:>8}{:>6}{:>10}", "office", "wfh", "vacation");

  for member in &table.members {
    print!("{:<24}", member.member.name);
    for day in &member.daily_status {
      let mark = if day.is_on_vacation {
        "V"
      } else if day.is_wfh {
        "H"
      } else {
        "O"
      };
      print!("{mark:>5}");
    }
    println!(
      "{:>8}{:>6}{:>10}",
      member.office_count, member.wfh_count, member.vacation_count
    );
  }
  println!(
    "{} members, week of {}  (O office, H home, V vacation)",
    table.total_members, table.week_start
  );
}

// ─── Vacations ────────────────────────────────────────────────────────────────

pub async fn vacation_show(app: &App) -> Result<()> {
  match app.schedule.current_vacation().await? {
    Some(vacation) => {
      println!(
        "{} to {} ({:?})",
        vacation.start_date, vacation.end_date, vacation.status
      );
      if let Some(notes) = vacation.notes.filter(|n| !n.is_empty()) {
        println!("notes: {notes}");
      }
    }
    None => println!("no current or upcoming vacation"),
  }
  Ok(())
}

pub async fn vacation_set(
  app: &App,
  from: NaiveDate,
  to: NaiveDate,
  notes: Option<String>,
) -> Result<()> {
  if from > to {
    bail!("vacation start {from} is after its end {to}");
  }
  let vacation = app.schedule.save_vacation(from, to, notes).await?;
  println!("vacation saved: {} to {}", vacation.start_date, vacation.end_date);
  Ok(())
}

pub async fn vacation_clear(app: &App) -> Result<()> {
  app.schedule.clear_vacation().await?;
  println!("current and future vacations cleared");
  Ok(())
}

// ─── Attendance and health ────────────────────────────────────────────────────

pub async fn attendance(app: &App, date: Option<NaiveDate>) -> Result<()> {
  let date = date.unwrap_or_else(|| Utc::now().date_naive());
  let rows = app.schedule.office_attendance(date).await?;
  if rows.is_empty() {
    println!("no attendance data for {date}");
    return Ok(());
  }

  println!("{date}");
  for row in rows {
    let place = if row.is_in_office { "office" } else { "home" };
    let department = row.department.unwrap_or_default();
    println!("{:<24}{:<8}{department}", row.full_name, place);
  }
  Ok(())
}

pub async fn ping(app: &App) -> Result<()> {
  if app.schedule.check_connection().await {
    println!("backend is reachable");
    Ok(())
  } else {
    bail!("backend is unreachable");
  }
}

// ─── Input helpers ────────────────────────────────────────────────────────────

/// Read a password from stdin.
fn prompt_password() -> Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
