//! Pure Yew view components for the leaderboard page.
//!
//! Everything here renders from props; state lives in `main.rs`.

use crate::config::EMPTY_BOARD_MESSAGE;
use crate::utils::{hide_broken_image, medal};
use lapboard::{format_seconds, BoardStats, Entry};
use std::rc::Rc;
use yew::prelude::*;

fn seconds_or_dashes(value: Option<f64>) -> String {
    value
        .map(|t| format!("{}s", format_seconds(t)))
        .unwrap_or_else(|| "--".to_string())
}

#[derive(Properties, PartialEq)]
pub struct StatsBarProps {
    pub stats: BoardStats,
    pub capacity: usize,
    pub new_fastest: bool,
}

/// Driver count, fastest time and top-N average, plus the record banner.
#[function_component(StatsBar)]
pub fn stats_bar(props: &StatsBarProps) -> Html {
    let stats = props.stats;
    html! {
        <div class="stats-area">
            if props.new_fastest {
                <div class="flash">{ "🚨 NEW FASTEST LAP! 🚨" }</div>
            }
            <div class="stats">
                <span><b>{ "Total Drivers: " }</b>{ stats.total_drivers }</span>
                <span><b>{ "Fastest: " }</b>{ seconds_or_dashes(stats.fastest) }</span>
                <span>
                    <b>{ format!("Avg Top {}: ", props.capacity) }</b>
                    { seconds_or_dashes(stats.average_top) }
                </span>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct RankingTableProps {
    pub rows: Rc<Vec<Entry>>,
    pub capacity: usize,
    pub total_drivers: u64,
}

/// The ranked top-N list.
#[function_component(RankingTable)]
pub fn ranking_table(props: &RankingTableProps) -> Html {
    html! {
        <div class="board">
            <div class="section-title">
                { format!("Top {} Leaderboard ", props.capacity) }
                <span class="muted">
                    { format!("(showing {} of {})", props.rows.len(), props.total_drivers) }
                </span>
            </div>
            <ol class="rows">
                { props.rows.iter().enumerate().map(|(rank, entry)| render_row(rank, entry)).collect::<Html>() }
                if props.rows.is_empty() {
                    <li class="empty-row">{ EMPTY_BOARD_MESSAGE }</li>
                }
            </ol>
        </div>
    }
}

fn render_row(rank: usize, entry: &Entry) -> Html {
    html! {
        <li key={entry.timestamp.to_string()} class="row">
            <div class="row-name">{ format!("{} {}. {}", medal(rank), rank + 1, entry.name) }</div>
            <div class="row-time">{ format!("{} sec", format_seconds(entry.time)) }</div>
        </li>
    }
}

#[derive(Properties, PartialEq)]
pub struct SponsorStripProps {
    pub url: Option<AttrValue>,
}

#[function_component(SponsorStrip)]
pub fn sponsor_strip(props: &SponsorStripProps) -> Html {
    let Some(url) = props.url.clone() else {
        return html! {};
    };
    html! {
        <div class="sponsor-wrap">
            <div class="sponsor-strip">
                // keyed on the URL so a hidden broken image does not hide the next sponsor
                <img key={url.to_string()} src={url.clone()} alt="Sponsor" onerror={hide_broken_image()} />
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct WinnerViewProps {
    pub winner: Entry,
    pub on_exit: Callback<MouseEvent>,
}

/// Full-screen winner reveal.
#[function_component(WinnerView)]
pub fn winner_view(props: &WinnerViewProps) -> Html {
    html! {
        <div class="winner-wrap">
            <div class="winner-title">{ "🏆 WINNER 🏆" }</div>
            <div class="winner-name">{ props.winner.name.clone() }</div>
            <div class="winner-time">{ format!("{} sec", format_seconds(props.winner.time)) }</div>
            <button class="btn-primary" onclick={props.on_exit.clone()}>
                { "Exit Winner Mode" }
            </button>
        </div>
    }
}
