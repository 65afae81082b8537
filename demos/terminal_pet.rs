//! Terminal Pet: Renders engine snapshots as a live status panel.
//!
//! Keys:
//! - `1`-`6`: force the corresponding state
//! - `space`: pause / resume
//! - `q` or Escape: quit

use crossbeam_channel::{bounded, Receiver};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute, queue,
    style::{Print, Stylize},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use petwheel::{sample_config, EngineConfig, EngineSnapshot, PetEngine, PetState};
use std::io::{self, Write};
use std::time::Duration;

/// Restores the terminal on drop, even if the demo bails out early.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn draw(out: &mut impl Write, snapshot: &EngineSnapshot, names: &[PetState], running: bool) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
    queue!(out, Print("Petwheel Terminal Pet".bold()), cursor::MoveToNextLine(2))?;

    for (n, name) in names.iter().enumerate() {
        let label = format!(" {} {:<9}", n + 1, name.as_str());
        if *name == snapshot.state {
            queue!(out, Print(label.black().on_yellow()))?;
        } else {
            queue!(out, Print(label))?;
        }
    }
    queue!(out, cursor::MoveToNextLine(2))?;

    let lines = [
        format!("texture     {}", snapshot.frame.texture_path),
        format!("frame       {} ({} ms of {} ms)", snapshot.frame_index, snapshot.frame_elapsed_ms, snapshot.frame.duration_ms),
        format!("in state    {} ms", snapshot.state_elapsed_ms),
        format!("loops       {}", snapshot.loop_count),
        format!("status      {}", if running { "running" } else { "paused" }),
    ];
    for line in lines {
        queue!(out, Print(line), cursor::MoveToNextLine(1))?;
    }

    queue!(out, cursor::MoveToNextLine(1), Print("1-6 state  space pause  q quit".dim()))?;
    out.flush()
}

fn run(engine: &PetEngine, snapshots: &Receiver<EngineSnapshot>) -> Result<(), Box<dyn std::error::Error>> {
    let names = engine.state_names().to_vec();
    let mut stdout = io::stdout();
    let mut running = true;
    let mut latest = engine.snapshot()?;

    loop {
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char(' ') => {
                        running = !running;
                        if running {
                            engine.start()?;
                        } else {
                            engine.stop()?;
                        }
                    }
                    KeyCode::Char(c) => {
                        let picked = c.to_digit(10).and_then(|d| names.get((d as usize).checked_sub(1)?));
                        if let Some(&state) = picked {
                            engine.set_state(state)?;
                        }
                    }
                    _ => {}
                }
            }
        }

        while let Ok(snapshot) = snapshots.try_recv() {
            latest = snapshot;
        }
        if !running {
            latest = engine.snapshot()?;
        }
        draw(&mut stdout, &latest, &names, running)?;
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let engine = PetEngine::spawn(sample_config(), &EngineConfig::default())?;

    // The listener runs on the engine thread; hand snapshots to the UI loop
    let (snapshot_tx, snapshot_rx) = bounded::<EngineSnapshot>(4);
    let subscription = engine.subscribe(move |snapshot: &EngineSnapshot| {
        let _ = snapshot_tx.try_send(snapshot.clone());
    })?;
    engine.start()?;

    let result = {
        let _guard = TerminalGuard::enter()?;
        run(&engine, &snapshot_rx)
    };

    subscription.dispose();
    result
}
