// SPDX-License-Identifier: MIT

//! Repday interactive client.
//!
//! A line-oriented event loop standing in for the mobile UI: one command at
//! a time, every remote call awaited before the next prompt. Validation and
//! remote failures print an alert line; deep-link failures are logged only.

use chrono::NaiveDate;
use repday::{
    config::Config,
    error::AppError,
    services::WorkoutPlanner,
    App,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(url = %config.supabase_url, "Starting repday");

    let app = App::new(config);
    app.session.initialize().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut planner: Option<WorkoutPlanner> = None;

    println!("repday — type `help` for commands");
    loop {
        sync_planner(&app, &mut planner).await;

        match app.session.session() {
            Some(session) => print!("{}> ", session.display_name()),
            None => print!("(signed out)> "),
        }
        use std::io::Write as _;
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = args.first() else {
            continue;
        };

        let result = match command {
            "help" => {
                print_help();
                Ok(())
            }
            "quit" | "exit" => break,
            "signup" => run_signup(&app, &args).await,
            "login" => run_login(&app, &args).await,
            "logout" => run_logout(&app, &mut lines).await,
            "link" => run_link(&app, &args).await,
            "whoami" => run_whoami(&app),
            _ => match planner.as_ref() {
                None => Err(AppError::Unauthorized),
                Some(planner) => match command {
                    "week" => run_week(planner).await,
                    "select" => run_select(planner, &args).await,
                    "list" => run_list(planner).await,
                    "add" => run_add(planner, &args).await,
                    "done" => run_set_op(planner, &args, SetOp::Advance).await,
                    "toggle" => run_set_op(planner, &args, SetOp::ToggleAll).await,
                    "rm" => run_delete(planner, &args, &mut lines).await,
                    _ => Err(AppError::Validation(format!("unknown command: {command}"))),
                },
            },
        };

        if let Err(e) = result {
            // The blocking-alert analog
            println!("Error: {e}");
        }
    }

    Ok(())
}

/// Keep the planner in step with the auth state: build one when a session
/// appears, drop it on sign-out.
async fn sync_planner(app: &App, planner: &mut Option<WorkoutPlanner>) {
    match app.session.session() {
        Some(session) => {
            // Rebuild on day rollover or when a deep link switched users
            let stale = planner
                .as_ref()
                .map(|p| p.today() != today() || p.user_id() != session.user.id)
                .unwrap_or(true);
            if stale {
                let repo: Arc<dyn repday::services::WorkoutRepository> =
                    app.workouts.clone();
                let fresh = WorkoutPlanner::new(repo, session.user.id.clone(), today());
                println!("Loading workouts...");
                if let Err(e) = fresh.refresh().await {
                    println!("Error: {e}");
                }
                *planner = Some(fresh);
            }
        }
        None => *planner = None,
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn print_help() {
    println!(
        "  signup <email> <password>   create an account\n\
         \x20 login <email> <password>    sign in\n\
         \x20 logout                      sign out (asks to confirm)\n\
         \x20 link <url>                  handle an auth deep link\n\
         \x20 whoami                      show the signed-in user\n\
         \x20 week                        show the current week\n\
         \x20 select <YYYY-MM-DD|1-7>     pick a day\n\
         \x20 list                        workouts on the selected day\n\
         \x20 add <name> [sets] [reps]    add a workout\n\
         \x20 done <n>                    complete the next set\n\
         \x20 toggle <n>                  toggle all sets\n\
         \x20 rm <n>                      delete a workout (asks to confirm)\n\
         \x20 quit"
    );
}

async fn run_signup(app: &App, args: &[&str]) -> repday::error::Result<()> {
    let (email, password) = credentials(args)?;
    app.session.sign_up(email, password).await?;
    println!("Account created! Check your email to verify your account.");
    Ok(())
}

async fn run_login(app: &App, args: &[&str]) -> repday::error::Result<()> {
    let (email, password) = credentials(args)?;
    app.session.sign_in(email, password).await?;
    println!("Welcome back!");
    Ok(())
}

fn credentials<'a>(args: &[&'a str]) -> repday::error::Result<(&'a str, &'a str)> {
    match args {
        &[_, email, password] => Ok((email, password)),
        _ => Err(AppError::Validation(
            "Please enter both email and password".to_string(),
        )),
    }
}

async fn run_logout(app: &App, lines: &mut Lines<BufReader<Stdin>>) -> repday::error::Result<()> {
    if confirm("Sign out?", lines).await {
        app.session.sign_out().await;
        println!("Signed out.");
    }
    Ok(())
}

async fn run_link(app: &App, args: &[&str]) -> repday::error::Result<()> {
    let url = args
        .get(1)
        .ok_or_else(|| AppError::Validation("usage: link <url>".to_string()))?;

    // The OS only delivers links for our registered scheme; mimic that here
    let prefix = format!("{}://", app.config.deep_link_scheme);
    if !url.starts_with(&prefix) {
        tracing::debug!(url, "Deep link with foreign scheme ignored");
        return Ok(());
    }

    app.session.handle_deep_link(url).await;
    Ok(())
}

fn run_whoami(app: &App) -> repday::error::Result<()> {
    match app.session.session() {
        Some(session) => {
            println!(
                "{} <{}> ({})",
                session.display_name(),
                session.user.email.as_deref().unwrap_or("no email"),
                session.user.id
            );
            Ok(())
        }
        None => Err(AppError::Unauthorized),
    }
}

async fn run_week(planner: &WorkoutPlanner) -> repday::error::Result<()> {
    let selected = planner.selected_date().await;
    for (i, day) in planner.week().iter().enumerate() {
        let marker = if day.date == selected { '>' } else { ' ' };
        let today = if day.is_today { " (today)" } else { "" };
        println!(
            "{marker} {}. {} {} {}{today}",
            i + 1,
            day.day_name,
            day.month,
            day.day_number
        );
    }
    Ok(())
}

async fn run_select(planner: &WorkoutPlanner, args: &[&str]) -> repday::error::Result<()> {
    let arg = args
        .get(1)
        .ok_or_else(|| AppError::Validation("usage: select <YYYY-MM-DD|1-7>".to_string()))?;

    let date = if let Ok(index) = arg.parse::<usize>() {
        let week = planner.week();
        week.get(index.wrapping_sub(1))
            .map(|day| day.date)
            .ok_or_else(|| AppError::Validation("day index must be 1-7".to_string()))?
    } else {
        arg.parse::<NaiveDate>()
            .map_err(|_| AppError::Validation(format!("not a date: {arg}")))?
    };

    println!("Loading workouts...");
    planner.select_date(date).await?;
    run_list(planner).await
}

async fn run_list(planner: &WorkoutPlanner) -> repday::error::Result<()> {
    let workouts = planner.workouts().await;
    println!("WORKOUTS — {}", planner.selected_date().await);
    if workouts.is_empty() {
        println!("  No workouts yet");
        return Ok(());
    }
    for (i, w) in workouts.iter().enumerate() {
        let check = if w.completed { "x" } else { " " };
        let reps = w.sets.first().map(|s| s.reps).unwrap_or(0);
        println!(
            "  [{check}] {}. {} {} — {} reps × {} sets ({}/{})",
            i + 1,
            w.emoji,
            w.name,
            reps,
            w.sets.len(),
            w.completed_sets(),
            w.sets.len()
        );
    }
    Ok(())
}

async fn run_add(planner: &WorkoutPlanner, args: &[&str]) -> repday::error::Result<()> {
    // Trailing numeric tokens are sets/reps; everything before is the name.
    let mut rest: Vec<&str> = args[1..].to_vec();
    let mut numbers: Vec<u32> = Vec::new();
    while numbers.len() < 2 {
        match rest.last().and_then(|t| t.parse::<u32>().ok()) {
            Some(n) if rest.len() > 1 => {
                numbers.insert(0, n);
                rest.pop();
            }
            _ => break,
        }
    }
    let name = rest.join(" ");
    let (sets, reps) = match numbers.as_slice() {
        [sets, reps] => (Some(*sets), Some(*reps)),
        [sets] => (Some(*sets), None),
        _ => (None, None),
    };

    let workout = planner.add_workout(&name, sets, reps).await?;
    println!("Added {} {}", workout.emoji, workout.name);
    run_list(planner).await
}

enum SetOp {
    Advance,
    ToggleAll,
}

async fn run_set_op(
    planner: &WorkoutPlanner,
    args: &[&str],
    op: SetOp,
) -> repday::error::Result<()> {
    let id = workout_id_at(planner, args).await?;
    match op {
        SetOp::Advance => planner.advance_workout(&id).await?,
        SetOp::ToggleAll => planner.toggle_workout(&id).await?,
    };
    run_list(planner).await
}

async fn run_delete(
    planner: &WorkoutPlanner,
    args: &[&str],
    lines: &mut Lines<BufReader<Stdin>>,
) -> repday::error::Result<()> {
    let id = workout_id_at(planner, args).await?;
    if confirm("Are you sure you want to delete this workout?", lines).await {
        planner.delete_workout(&id).await?;
        run_list(planner).await?;
    }
    Ok(())
}

/// Resolve a 1-based list index argument to a workout id.
async fn workout_id_at(planner: &WorkoutPlanner, args: &[&str]) -> repday::error::Result<String> {
    let index: usize = args
        .get(1)
        .and_then(|a| a.parse().ok())
        .ok_or_else(|| AppError::Validation("expected a workout number".to_string()))?;

    planner
        .workouts()
        .await
        .get(index.wrapping_sub(1))
        .map(|w| w.id.clone())
        .ok_or_else(|| AppError::NotFound(format!("workout #{index}")))
}

async fn confirm(prompt: &str, lines: &mut Lines<BufReader<Stdin>>) -> bool {
    print!("{prompt} [y/N] ");
    use std::io::Write as _;
    std::io::stdout().flush().ok();

    matches!(
        lines.next_line().await,
        Ok(Some(answer)) if answer.trim().eq_ignore_ascii_case("y")
    )
}

/// Initialize logging. `RUST_LOG` controls verbosity; defaults keep the
/// crate at debug and everything else at warn so the prompt stays readable.
fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("repday=debug".parse().unwrap())
                .add_directive("warn".parse().unwrap()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
