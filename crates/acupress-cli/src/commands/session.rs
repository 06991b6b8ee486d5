//! `acupress session run`: a live guided session in the terminal.
//!
//! Keys (followed by Enter): `p` pause/resume, `r` reset, `s` status, `q` quit.

use std::io::Write;
use std::time::Duration;

use acupress_core::events::Event;
use acupress_core::storage::GuidanceConfig;
use acupress_core::{Config, Rating, SessionDriver};
use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use super::technique::print_details;
use super::{clock, open_recorder, CliResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a guided session for a technique
    Run {
        /// Technique id
        technique_id: String,
        /// Override the technique's duration (seconds)
        #[arg(long)]
        duration: Option<u32>,
        /// Rate the session without being prompted (1-5)
        #[arg(long)]
        rating: Option<u8>,
        /// Review comment, used together with --rating
        #[arg(long)]
        comment: Option<String>,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
}

type StdinLines = Lines<BufReader<Stdin>>;

pub async fn run(action: SessionAction) -> CliResult {
    match action {
        SessionAction::Run {
            technique_id,
            duration,
            rating,
            comment,
            json,
        } => {
            let preset = rating.map(Rating::new).transpose()?;
            let config = Config::load()?;
            run_session(&config, &technique_id, duration, preset, comment, json).await
        }
    }
}

async fn run_session(
    config: &Config,
    technique_id: &str,
    duration: Option<u32>,
    preset: Option<Rating>,
    comment: Option<String>,
    json: bool,
) -> CliResult {
    let recorder = open_recorder(config)?;
    let technique = recorder.technique(technique_id).await?;
    let total_secs = match duration.unwrap_or(technique.duration) {
        0 if duration.is_none() => config.session.default_duration_secs,
        secs => secs,
    };

    if !json {
        print_details(&technique, recorder.store().is_favorite(&technique.id)?);
        println!();
        println!("p = pause/resume, r = reset, s = status, q = quit");
    }

    debug!(technique = %technique.id, total_secs, "running session");
    let mut driver = SessionDriver::new(config.session.tick_interval());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    render(&driver.start(total_secs)?, &driver, &config.guidance, json)?;

    loop {
        tokio::select! {
            event = driver.next_event(), if driver.is_ticking() => {
                let Some(event) = event else { continue };
                render(&event, &driver, &config.guidance, json)?;
                if event.is_completion() {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                let event = match line.trim() {
                    "p" => driver.toggle(),
                    "s" => Some(driver.timer().snapshot()),
                    "r" => driver.reset(),
                    "q" => {
                        debug!(remaining_secs = driver.timer().remaining_secs(), "session quit");
                        if !json {
                            println!("session abandoned");
                        }
                        return Ok(());
                    }
                    _ => None,
                };
                if let Some(event) = event {
                    render(&event, &driver, &config.guidance, json)?;
                }
            }
            else => {
                if !json {
                    println!("session stopped at {}", clock(driver.timer().remaining_secs()));
                }
                return Ok(());
            }
        }
    }

    let Some(prompt) = driver.take_rating_prompt() else {
        return Ok(());
    };

    let session = match preset {
        Some(rating) => prompt.submit(&technique, rating, comment),
        None => {
            tokio::time::sleep(Duration::from_secs(config.session.rating_prompt_delay_secs)).await;
            match ask_rating(&mut lines, stdin_open).await? {
                Some(rating) => {
                    let comment = ask_line(&mut lines, "Comment (optional): ").await?;
                    prompt.submit(&technique, rating, comment.filter(|c| !c.is_empty()))
                }
                None => prompt.skip(&technique),
            }
        }
    };

    let entry = recorder.record(session).await?;
    if json {
        println!("{}", serde_json::to_string(&entry)?);
    } else if entry.synced {
        println!("session saved ({}/5)", entry.rating.stars());
    } else {
        println!(
            "session saved locally ({}/5); run `acupress history sync` when online",
            entry.rating.stars()
        );
    }
    Ok(())
}

fn render(
    event: &Event,
    driver: &SessionDriver,
    guidance: &GuidanceConfig,
    json: bool,
) -> CliResult {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    let timer = driver.timer();
    match event {
        Event::SessionStarted { total_secs, .. } => {
            println!("started, {}", clock(*total_secs));
        }
        Event::SessionPaused { remaining_secs, .. } => {
            println!("paused at {}", clock(*remaining_secs));
        }
        Event::SessionResumed { remaining_secs, .. } => {
            println!("resumed at {}", clock(*remaining_secs));
        }
        Event::SessionReset { total_secs, .. } => {
            println!("reset to {}, press p to begin again", clock(*total_secs));
        }
        Event::Tick { remaining_secs, .. } => {
            let cue = timer.guidance();
            if guidance.sound_enabled && cue.cue_hz.is_some() {
                print!("\x07");
            }
            println!("[{}] {}", clock(*remaining_secs), cue.headline);
            if guidance.show_instructions && timer.breathing().at_phase_start() {
                println!("        {}", cue.instruction);
            }
        }
        Event::SessionCompleted { .. } => {
            println!("[{}] session complete", clock(0));
        }
        Event::StateSnapshot {
            state,
            remaining_secs,
            guide_phase,
            phase_remaining_secs,
            progress_pct,
            ..
        } => {
            println!(
                "{state:?}: {} left, {guide_phase:?} {phase_remaining_secs}s, {progress_pct:.0}% done",
                clock(*remaining_secs)
            );
        }
    }
    std::io::stdout().flush()?;
    Ok(())
}

/// `None` when the user skips (empty line or closed stdin).
async fn ask_rating(lines: &mut StdinLines, stdin_open: bool) -> std::io::Result<Option<Rating>> {
    if !stdin_open {
        return Ok(None);
    }
    loop {
        let Some(answer) = ask_line(lines, "Rate this session 1-5 (Enter to skip): ").await? else {
            return Ok(None);
        };
        if answer.is_empty() {
            return Ok(None);
        }
        match answer.parse::<u8>().ok().and_then(|n| Rating::new(n).ok()) {
            Some(rating) => return Ok(Some(rating)),
            None => println!("please enter a number from 1 to 5"),
        }
    }
}

async fn ask_line(lines: &mut StdinLines, prompt: &str) -> std::io::Result<Option<String>> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.map(|l| l.trim().to_string()))
}
