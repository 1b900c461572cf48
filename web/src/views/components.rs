use dioxus::prelude::*;
use types::StatusTone;

#[component]
pub fn StatCard(label: String, value: usize, #[props(default)] accent: &'static str) -> Element {
    rsx! {
        div { class: "card stat-card",
            div { class: "stat-label", "{label}" }
            div { class: "stat-value {accent}", "{value}" }
        }
    }
}

#[component]
pub fn StatusBadge(label: String, tone: StatusTone) -> Element {
    rsx! {
        span { class: tone.css_class(), "{label}" }
    }
}

/// Copy icon that flips to a check mark while `copied` is set.
#[component]
pub fn CopyButton(copied: bool, onclick: EventHandler<MouseEvent>) -> Element {
    rsx! {
        button {
            class: "copy-btn",
            class: if copied { "copied" },
            title: if copied { "Copied" } else { "Copy" },
            onclick: move |evt| onclick.call(evt),
            if copied { "✓" } else { "⧉" }
        }
    }
}

/// First / Previous / page numbers / Next / Last. Hidden when there is only
/// one page.
#[component]
pub fn Pagination(
    current: usize,
    total_pages: usize,
    window: Vec<usize>,
    on_go: EventHandler<i64>,
) -> Element {
    if total_pages <= 1 {
        return rsx! {};
    }

    let at_start = current <= 1;
    let at_end = current >= total_pages;
    let last = total_pages as i64;
    let prev = current as i64 - 1;
    let next = current as i64 + 1;

    rsx! {
        div { class: "pagination",
            button {
                class: "btn btn-sm btn-secondary",
                disabled: at_start,
                onclick: move |_| on_go.call(1),
                "First"
            }
            button {
                class: "btn btn-sm btn-secondary",
                disabled: at_start,
                onclick: move |_| on_go.call(prev),
                "Previous"
            }
            for page in window {
                button {
                    key: "{page}",
                    class: if page == current { "btn btn-sm btn-primary" } else { "btn btn-sm btn-secondary" },
                    onclick: move |_| on_go.call(page as i64),
                    "{page}"
                }
            }
            button {
                class: "btn btn-sm btn-secondary",
                disabled: at_end,
                onclick: move |_| on_go.call(next),
                "Next"
            }
            button {
                class: "btn btn-sm btn-secondary",
                disabled: at_end,
                onclick: move |_| on_go.call(last),
                "Last"
            }
        }
    }
}
