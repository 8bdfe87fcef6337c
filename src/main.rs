//! Main module for the trade-show leaderboard using Yew.
//! Wires UI components, state hooks, and side-effect logic.

use lapboard::{
    defaults::{LAP_FIELDS, NEW_FASTEST_MS, SPONSOR_ROTATE_MS},
    now_ms,
    persistence::{load_state, save_state, BrowserStore},
    EventConfig, LapSheet,
};
use std::rc::Rc;
use yew::prelude::*;

mod components;
mod config;
mod hooks;
mod utils;

use components::{RankingTable, SponsorStrip, StatsBar, WinnerView};
use config::*;
use hooks::{use_flash, use_sponsor_rotation};
use utils::{checkbox_checked, confirm_reset, hide_broken_image, input_value, textarea_value};

/// Leaderboard page: operator panel, stats, ranked list and sponsor strip.
#[function_component(App)]
fn app() -> Html {
    // Storage is read once; both handles start from the same record.
    let restored = use_memo((), |_| load_state(&BrowserStore, ACTIVE_VARIANT));
    let event = use_state(|| restored.0.clone());
    let board = use_state(|| restored.1.clone());

    let sheet = use_state(LapSheet::default);
    let submit_error = use_state(|| None::<String>);
    let winner_mode = use_state(|| false);
    let flash = use_flash(NEW_FASTEST_MS);

    let sponsor_urls = event.sponsor_urls();
    let rotation = use_sponsor_rotation(sponsor_urls.len(), SPONSOR_ROTATE_MS);
    let active_sponsor = rotation
        .current(&sponsor_urls)
        .map(|url| AttrValue::from(url.to_string()));

    // Persist after every change to the event text or the board
    use_effect_with(
        ((*event).clone(), (*board).clone()),
        |(event, board)| {
            save_state(&BrowserStore, ACTIVE_VARIANT, event, board);
            || ()
        },
    );

    // --- Operator sheet ---
    let on_name_input = {
        let sheet = sheet.clone();
        Callback::from(move |e: InputEvent| {
            let mut next = (*sheet).clone();
            next.name = input_value(&e);
            sheet.set(next);
        })
    };

    let on_submit = {
        let board = board.clone();
        let sheet = sheet.clone();
        let submit_error = submit_error.clone();
        let trigger_flash = flash.trigger.clone();
        Callback::from(move |_: ()| {
            let mut next_board = (*board).clone();
            let mut next_sheet = (*sheet).clone();
            match next_board.submit_sheet(&mut next_sheet, now_ms()) {
                Ok(submission) => {
                    if submission.new_fastest {
                        trigger_flash.emit(());
                    }
                    board.set(next_board);
                    sheet.set(next_sheet);
                    submit_error.set(None);
                }
                Err(e) => submit_error.set(Some(e.to_string())),
            }
        })
    };

    let submit_on_enter = {
        let on_submit = on_submit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                on_submit.emit(());
            }
        })
    };

    let lap_inputs = (0..LAP_FIELDS)
        .map(|i| {
            let oninput = {
                let sheet = sheet.clone();
                Callback::from(move |e: InputEvent| {
                    let mut next = (*sheet).clone();
                    next.laps[i] = input_value(&e);
                    sheet.set(next);
                })
            };
            html! {
                <input
                    key={i}
                    class="input"
                    type="text"
                    inputmode="decimal"
                    placeholder={format!("Lap {}", i + 1)}
                    title={LAP_HINT}
                    value={sheet.laps[i].clone()}
                    {oninput}
                    onkeydown={submit_on_enter.clone()}
                />
            }
        })
        .collect::<Html>();

    // --- Board controls ---
    let on_reset = {
        let board = board.clone();
        let clear_flash = flash.clear.clone();
        let winner_mode = winner_mode.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*board).clone();
            if next.reset(confirm_reset()) {
                board.set(next);
                clear_flash.emit(());
                winner_mode.set(false);
            }
        })
    };

    let on_winner = {
        let winner_mode = winner_mode.clone();
        Callback::from(move |_: MouseEvent| winner_mode.set(true))
    };

    // --- Event text ---
    let edit_event = |apply: fn(&mut EventConfig, String)| {
        let event = event.clone();
        Callback::from(move |e: InputEvent| {
            let mut next = (*event).clone();
            apply(&mut next, input_value(&e));
            event.set(next);
        })
    };
    let on_event_name_input = edit_event(|config, value| config.event_name = value);
    let on_subtitle_input = edit_event(|config, value| config.subtitle = value);

    let on_sponsors_input = {
        let event = event.clone();
        Callback::from(move |e: InputEvent| {
            let mut next = (*event).clone();
            next.sponsor_urls_text = textarea_value(&e);
            event.set(next);
        })
    };

    let on_show_logo_change = {
        let event = event.clone();
        Callback::from(move |e: Event| {
            let mut next = (*event).clone();
            next.show_logo = checkbox_checked(&e);
            event.set(next);
        })
    };

    if *winner_mode {
        if let Some(winner) = board.leader().cloned() {
            let on_exit = {
                let winner_mode = winner_mode.clone();
                Callback::from(move |_: MouseEvent| winner_mode.set(false))
            };
            return html! { <WinnerView {winner} {on_exit} /> };
        }
    }

    let capacity = ACTIVE_VARIANT.capacity;
    let rows = Rc::new(board.ranked().into_iter().cloned().collect::<Vec<_>>());

    html! {
        <div class="page">
            <div class="card">
                <header class="masthead">
                    <div>
                        if event.show_logo {
                            <div class="logo">
                                <img src={LOGO_SRC} alt="Logo" onerror={hide_broken_image()} />
                            </div>
                        }
                        <div class="h1">{ event.event_name.clone() }</div>
                        <div class="sub">{ event.subtitle.clone() }</div>
                    </div>
                    <div class="actions">
                        <button class="btn-blue" onclick={on_winner} disabled={board.is_empty()}>
                            { "Winner Reveal" }
                        </button>
                        <button class="btn-red" onclick={on_reset}>{ "Reset Event" }</button>
                    </div>
                </header>

                <SponsorStrip url={active_sponsor} />

                <section class="operator-panel">
                    <div class="section-title">{ "Operator Panel" }</div>
                    <div class="operator-grid">
                        <input
                            class="input"
                            placeholder={NAME_PLACEHOLDER}
                            value={sheet.name.clone()}
                            oninput={on_name_input}
                            onkeydown={submit_on_enter}
                        />
                        <div class="lap-grid">{ lap_inputs }</div>
                        <button class="btn-primary" onclick={on_submit.reform(|_: MouseEvent| ())}>
                            { format!("Add Driver (Best of {})", LAP_FIELDS) }
                        </button>
                        if let Some(ref err) = *submit_error {
                            <div class="input-error">{ err.clone() }</div>
                        }

                        <div class="field-group">
                            <div class="field-label">{ "Sponsor logo URLs (one per line):" }</div>
                            <textarea
                                class="textarea"
                                rows="3"
                                value={event.sponsor_urls_text.clone()}
                                oninput={on_sponsors_input}
                            />
                            <div class="hint">{ "Tip: Use DIRECT image links ending with .png/.jpg/.webp" }</div>
                        </div>

                        <div class="field-group">
                            <div class="field-label">{ "Edit text:" }</div>
                            <input class="input" value={event.event_name.clone()} oninput={on_event_name_input} />
                            <input class="input" value={event.subtitle.clone()} oninput={on_subtitle_input} />
                            <label class="checkbox">
                                <input
                                    type="checkbox"
                                    checked={event.show_logo}
                                    onchange={on_show_logo_change}
                                />
                                { "Show logo at top" }
                            </label>
                        </div>
                    </div>
                </section>

                <StatsBar stats={board.stats()} {capacity} new_fastest={flash.active} />
                <RankingTable {rows} {capacity} total_drivers={board.total_drivers()} />
            </div>
        </div>
    }
}

/// Entry point: initializes Yew renderer for the App component.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
