// SPDX-License-Identifier: GPL-3.0-only

//! Kioskboard headless host
//!
//! Drives a keyboard controller from stdin so layouts and key behavior can be
//! tried without a display. One command per line:
//!
//! ```text
//! focus               bind the text field and show the keyboard
//! blur <owner>        field lost focus; owner is field, key, other or none
//! outside             tap outside the keyboard
//! tap <label>         tap the key with that value or label
//! press <label>       press without releasing (shows the popup)
//! release             release the pressed key
//! shift | backspace | space | done
//! lang <code>         switch layout
//! layouts             list available layouts
//! popup on|off        enable or disable the key-press preview
//! size <w> <h>        resize the keyboard surface
//! show                print the keyboard and field state
//! quit
//! ```

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use kioskboard::config::Config;
use kioskboard::input::{FocusOwner, TextField, TextTarget};
use kioskboard::keyboard::{
    KeyPosition, KeyboardController, KeyboardEvent, SurfaceMetrics, TapTarget,
};
use kioskboard::layout::{KeyType, LayoutRepository};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    match "kioskboard=info".parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Invalid log directive: {}", e),
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load();

    let repository = Arc::new(LayoutRepository::new(config.layouts_dir.clone()));
    if let Err(e) = repository.initialize() {
        tracing::error!("No keyboard layout available: {}", e);
        std::process::exit(1);
    }

    let mut keyboard = match KeyboardController::from_config(Arc::clone(&repository), &config) {
        Ok(keyboard) => keyboard,
        Err(e) => {
            tracing::error!("Failed to create keyboard: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Keyboard ready: {} ({}), {} layouts from {}",
        keyboard.layout().name,
        keyboard.layout().language_code,
        repository.len(),
        repository
            .source_dir()
            .map_or_else(|| "embedded resources".to_string(), |dir| dir.display().to_string())
    );

    let field = TextField::new("").into_handle();
    let mut events = keyboard.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // Focus check scheduled on the previous turn
    let mut pending_check: Option<(u64, FocusOwner)> = None;

    loop {
        if let Some((ticket, owner)) = pending_check.take() {
            keyboard.run_deferred_focus_check(ticket, owner);
        }
        let popup_deadline = keyboard.next_popup_deadline();

        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {}", e);
                        break;
                    }
                };

                let mut words = line.split_whitespace();
                let Some(command) = words.next() else {
                    continue;
                };
                let argument = words.next().unwrap_or_default();
                let second_argument = words.next().unwrap_or_default();

                match command {
                    "quit" => break,
                    "focus" => keyboard.on_field_focus_gained(field.clone()),
                    "blur" => match parse_focus_owner(argument) {
                        Some(owner) => {
                            pending_check = keyboard.on_field_focus_lost().map(|ticket| (ticket, owner));
                        }
                        None => println!("unknown focus owner '{}'", argument),
                    },
                    "outside" => keyboard.on_tap(TapTarget::Outside),
                    "tap" | "press" => match find_key(&keyboard, argument) {
                        Some(position) if command == "tap" => {
                            keyboard.tap_key(position, Instant::now());
                        }
                        Some(position) => keyboard.press_key(position, Instant::now()),
                        None => println!("no key '{}'", argument),
                    },
                    "release" => keyboard.release_key(),
                    "shift" | "backspace" | "space" | "done" => {
                        let key_type = KeyType::from(command.to_string());
                        match keyboard.grid().position_of_type(&key_type) {
                            Some(position) => {
                                keyboard.tap_key(position, Instant::now());
                            }
                            None => println!("layout has no {} key", key_type),
                        }
                    }
                    "lang" => {
                        if let Err(e) = keyboard.set_language(argument) {
                            tracing::error!("Failed to switch layout: {}", e);
                        }
                    }
                    "popup" => match argument {
                        "on" => keyboard.set_show_key_press_popup(true),
                        "off" => keyboard.set_show_key_press_popup(false),
                        _ => println!("usage: popup on|off"),
                    },
                    "size" => match (argument.parse::<f32>(), second_argument.parse::<f32>()) {
                        (Ok(width), Ok(height)) if width > 0.0 && height > 0.0 => {
                            let surface = SurfaceMetrics {
                                width,
                                height,
                                ..*keyboard.surface()
                            };
                            keyboard.set_surface(surface);
                        }
                        _ => println!("usage: size <width> <height>"),
                    },
                    "layouts" => {
                        for (code, name) in repository.available_layouts_with_names() {
                            println!("{:<8} {}", code, name);
                        }
                    }
                    "show" => {
                        let view = keyboard.snapshot();
                        let field = field.borrow();
                        println!(
                            "{:?} [{}] bound={} text={:?} caret={}",
                            view.state,
                            view.language_code,
                            keyboard.is_bound(),
                            field.text(),
                            field.caret_index()
                        );
                    }
                    other => println!("unknown command '{}'", other),
                }
            }
            _ = sleep_until(popup_deadline) => {
                keyboard.tick(Instant::now());
            }
            Some(event) = events.next() => {
                print_event(&event);
                if event.affects_keys() {
                    print_keys(&keyboard);
                }
            }
        }
    }

    tracing::info!("Keyboard host exiting");
}

/// Waits for the popup deadline, or forever when no popup is shown.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Finds a key by value or label in the current layout.
fn find_key(keyboard: &KeyboardController, label: &str) -> Option<KeyPosition> {
    if label.is_empty() {
        return None;
    }
    keyboard.grid().position_of(label)
}

fn parse_focus_owner(word: &str) -> Option<FocusOwner> {
    match word {
        "field" => Some(FocusOwner::TextField),
        "key" => Some(FocusOwner::KeyboardKey),
        "other" => Some(FocusOwner::Other),
        "" | "none" => Some(FocusOwner::Nothing),
        _ => None,
    }
}

fn print_event(event: &KeyboardEvent) {
    match event {
        KeyboardEvent::VisibilityChanged(visible) => {
            println!("keyboard {}", if *visible { "shown" } else { "hidden" });
        }
        KeyboardEvent::ShiftChanged(active) => {
            println!("shift {}", if *active { "on" } else { "off" });
        }
        KeyboardEvent::TextChanged { text, caret } => println!("text {:?} caret {}", text, caret),
        KeyboardEvent::PopupShown(preview) => println!(
            "popup {:?} at ({}, {})",
            preview.text, preview.placement.left, preview.placement.top
        ),
        KeyboardEvent::PopupHidden => println!("popup hidden"),
        KeyboardEvent::LayoutChanged { language_code, name } => {
            println!("layout {} ({})", name, language_code);
        }
        KeyboardEvent::DoneClicked => println!("done"),
    }
}

/// Prints the key labels row by row for the current shift state.
fn print_keys(keyboard: &KeyboardController) {
    let grid = keyboard.grid();
    let shift = keyboard.is_shift_active();
    for row in 0..grid.row_count() {
        let labels: Vec<&str> = grid
            .row(row)
            .iter()
            .map(|grid_key| grid_key.key.label(shift))
            .filter(|label| !label.is_empty())
            .collect();
        println!("  {}", labels.join(" "));
    }
}
