//! Terminal front-ends for the quiz and the memory board.

use std::error::Error;
use std::time::Duration;

use brain_core::model::{
    AnswerOutcome, DEFAULT_SYMBOLS, FlipOutcome, GameResult, MemoryBoard, QuizSession,
    SessionStatus,
};
use brain_core::time::format_mm_ss;
use services::{AppServices, QuizError, QuizRequest, SubmitOutcome};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};

type Input = Lines<BufReader<Stdin>>;

const MISMATCH_DELAY: Duration = Duration::from_secs(1);
const BOARD_COLUMNS: usize = 4;

fn stdin_lines() -> Input {
    BufReader::new(tokio::io::stdin()).lines()
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

fn render_question(session: &QuizSession) {
    let Some(question) = session.current_question() else {
        return;
    };
    println!();
    println!(
        "[{}] Question {}/{} ({}% done)  score {}",
        format_mm_ss(session.time_remaining_secs()),
        session.current_index() + 1,
        session.total_questions(),
        session.progress_percent(),
        session.score()
    );
    println!("  {}", question.prompt());
    for (slot, option) in question.options().iter().enumerate() {
        println!("    {}) {option}", slot + 1);
    }
}

pub async fn play_quiz(services: &AppServices, request: &QuizRequest) -> Result<(), Box<dyn Error>> {
    let quiz = services.quiz().start_session(request).await?;
    let mut state = quiz.handle.subscribe();
    let mut input = stdin_lines();
    render_question(&quiz.handle.snapshot());

    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() || state.borrow_and_update().is_ended() {
                    break;
                }
            }
            line = input.next_line() => {
                let Some(line) = line? else {
                    quiz.handle.quit().await.ok();
                    break;
                };
                match handle_quiz_input(&quiz.handle, line.trim()).await {
                    Ok(()) => {}
                    Err(QuizError::RunnerClosed) => break,
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }

    let result = quiz
        .finished
        .await?
        .ok_or("quiz stopped before it finished")?;
    print_result(&result);
    submit(services, &result).await
}

async fn handle_quiz_input(handle: &services::QuizHandle, input: &str) -> Result<(), QuizError> {
    let snapshot = handle.snapshot();
    match input {
        "p" => {
            if handle.pause().await? {
                println!("Paused. Type r to resume.");
            }
        }
        "r" => {
            if handle.resume().await? {
                render_question(&handle.snapshot());
            }
        }
        "q" => {
            handle.quit().await?;
        }
        _ => {
            let choice = input
                .parse::<usize>()
                .ok()
                .and_then(|slot| slot.checked_sub(1))
                .and_then(|slot| {
                    snapshot
                        .current_question()
                        .and_then(|q| q.options().get(slot).copied())
                });
            let Some(value) = choice else {
                println!("Pick 1-4, or p / r / q.");
                return Ok(());
            };
            match handle.answer(value).await? {
                AnswerOutcome::Recorded { correct, finished } => {
                    println!("{}", if correct { "Correct!" } else { "Wrong." });
                    if !finished {
                        render_question(&handle.snapshot());
                    }
                }
                AnswerOutcome::Ignored => {
                    if snapshot.status() == SessionStatus::Paused {
                        println!("Paused. Type r to resume.");
                    }
                }
            }
        }
    }
    Ok(())
}

//
// ─── MEMORY ────────────────────────────────────────────────────────────────────
//

fn render_board(board: &MemoryBoard) {
    println!();
    let clock = if board.is_started() {
        format_mm_ss(board.elapsed_secs())
    } else {
        "--:--".to_owned()
    };
    println!(
        "[{clock}] moves {}  pairs {}/{}",
        board.moves(),
        board.matched_pairs(),
        board.pairs()
    );
    let cells: Vec<String> = (0..board.len())
        .map(|i| match board.visible_symbol(i) {
            Some(symbol) => format!("{:>2}:{symbol:<7}", i + 1),
            None => format!("{:>2}:{:<7}", i + 1, "?"),
        })
        .collect();
    for row in cells.chunks(BOARD_COLUMNS) {
        println!("  {}", row.join(" "));
    }
}

pub async fn play_memory(services: &AppServices) -> Result<(), Box<dyn Error>> {
    let mut board = {
        let mut rng = rand::rng();
        MemoryBoard::shuffled(&mut rng, &DEFAULT_SYMBOLS)?
    };
    let mut input = stdin_lines();
    let mut clock = interval(Duration::from_secs(1));
    clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut hide_at: Option<Instant> = None;

    println!("Find every pair. Type a card number, or q to quit.");
    render_board(&board);

    while !board.is_complete() {
        tokio::select! {
            _ = clock.tick() => board.tick(),
            () = async {
                match hide_at {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending().await,
                }
            } => {
                hide_at = None;
                board.hide_mismatch();
                render_board(&board);
            }
            line = input.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                let line = line.trim();
                if line == "q" {
                    println!("Left the board unfinished; nothing was saved.");
                    return Ok(());
                }
                let Some(index) = line.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
                    println!("Type a card number between 1 and {}.", board.len());
                    continue;
                };
                match board.flip(index) {
                    FlipOutcome::Ignored => println!("That card cannot be flipped right now."),
                    FlipOutcome::Mismatched => {
                        hide_at = Some(Instant::now() + MISMATCH_DELAY);
                        render_board(&board);
                    }
                    FlipOutcome::Revealed | FlipOutcome::Matched | FlipOutcome::Completed => {
                        render_board(&board);
                    }
                }
            }
        }
    }

    let result = board.result()?;
    println!("All pairs found in {} moves!", board.moves());
    print_result(&result);
    submit(services, &result).await
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

fn print_result(result: &GameResult) {
    println!();
    println!("{}", result.ended_by().message());
    println!(
        "{}  {}/{} ({}%) in {}",
        result.rating().headline(),
        result.score(),
        result.total_questions(),
        result.percentage(),
        format_mm_ss(result.time_taken_secs())
    );
    println!("Trophy: {:?}", result.trophy());
}

async fn submit(services: &AppServices, result: &GameResult) -> Result<(), Box<dyn Error>> {
    let tracker = services.submission_tracker();
    match tracker.submit(result).await? {
        SubmitOutcome::Persisted { id, scope } => println!("Saved ({scope:?}) as {id}."),
        SubmitOutcome::Failed { reason } => println!("Could not save this result: {reason}"),
    }
    Ok(())
}
