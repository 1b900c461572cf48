use dioxus::prelude::*;
use types::DashboardModel;
use types::dashboard::COPIED_DISPLAY;

use super::components::{CopyButton, Pagination, StatCard, StatusBadge};
use crate::{browser, use_error};

#[component]
pub fn Dashboard() -> Element {
    let mut model = use_signal(DashboardModel::new);
    let mut loading = use_signal(|| true);
    let mut error_state = use_error();

    // Fetch users on mount
    use_effect(move || {
        spawn(async move {
            loading.set(true);
            match api::list_users().await {
                Ok(users) => model.write().replace_users(users),
                Err(e) => error_state.set_server_error(&e),
            }
            loading.set(false);
        });
    });

    let sync_all = move |_: MouseEvent| {
        if !model.write().begin_sync() {
            return;
        }
        spawn(async move {
            let refetched = match api::sync_all_subscriptions().await {
                Ok(_) => api::list_users().await,
                Err(e) => Err(e),
            };
            let outcome = model.write().finish_sync(refetched);
            if let Err(e) = outcome {
                error_state.set_server_error(&e);
            }
        });
    };

    let mut sync_user = move |user_id: i64| {
        if !model.write().begin_user_sync(user_id) {
            return;
        }
        spawn(async move {
            let refetched = match api::sync_user_subscription(user_id).await {
                Ok(_) => api::list_users().await,
                Err(e) => Err(e),
            };
            let outcome = model.write().finish_user_sync(user_id, refetched);
            if let Err(e) = outcome {
                error_state.set_server_error(&e);
            }
        });
    };

    let copy = move |value: String| {
        spawn(async move {
            match browser::copy_to_clipboard(&value).await {
                Ok(()) => {
                    let ticket = model.write().mark_copied(value);
                    gloo_timers::future::sleep(COPIED_DISPLAY).await;
                    model.write().clear_copied(ticket);
                }
                Err(error) => tracing::warn!(%error, "failed to copy to clipboard"),
            }
        });
    };

    if loading() {
        return rsx! {
            div { class: "loading", "Loading..." }
        };
    }

    let dashboard = model.read();
    let stats = dashboard.stats();
    let syncing = dashboard.is_syncing();
    let total = dashboard.users().len();
    let showing = match dashboard.showing_range() {
        Some((first, last)) => format!("Showing {first}-{last} of {total} users"),
        None => "No users yet".to_string(),
    };

    rsx! {
        div {
            div { class: "page-header",
                div { class: "page-header-content",
                    h1 { class: "page-title", "Admin Dashboard" }
                    p { class: "page-subtitle", "Manage your users and subscriptions." }
                }
                div { class: "page-header-actions",
                    button {
                        class: "btn btn-primary",
                        disabled: syncing,
                        onclick: sync_all,
                        if syncing { "Syncing..." } else { "Sync All Subscriptions" }
                    }
                }
            }

            div { class: "grid grid-cols-2",
                StatCard { label: "Total Users", value: stats.total_users }
                StatCard {
                    label: "Active Subscriptions",
                    value: stats.active_subscriptions,
                    accent: "stat-value-success",
                }
            }

            div { class: "card",
                div { class: "card-header",
                    h2 { class: "card-title", "All Users" }
                    p { class: "card-subtitle", "{showing}" }
                }
                div { class: "table-container",
                    table {
                        thead {
                            tr {
                                th { "Email" }
                                th { "Created" }
                                th { "Status" }
                                th { "Plan" }
                                th { "Valid Until" }
                                th { "Last Synced" }
                                th {}
                            }
                        }
                        tbody {
                            for user in dashboard.page() {
                                {
                                    let user_id = user.id;
                                    let email = user.email.clone();
                                    let copied = dashboard.is_copied(&user.email);
                                    let row_syncing = dashboard.is_user_syncing(user_id);
                                    rsx! {
                                        tr { key: "{user_id}",
                                            td {
                                                div { class: "email-cell",
                                                    span { "{user.email}" }
                                                    CopyButton {
                                                        copied,
                                                        onclick: move |_| copy(email.clone()),
                                                    }
                                                }
                                            }
                                            td { {user.created_label()} }
                                            td {
                                                StatusBadge {
                                                    label: user.status_label().to_string(),
                                                    tone: user.status_tone(),
                                                }
                                            }
                                            td { {user.plan_id.label()} }
                                            td { {user.valid_until_label()} }
                                            td { class: "text-muted", {user.last_synced_label()} }
                                            td {
                                                button {
                                                    class: "btn btn-sm btn-secondary",
                                                    disabled: row_syncing || syncing,
                                                    onclick: move |_| sync_user(user_id),
                                                    if row_syncing { "Syncing..." } else { "Sync" }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                div { class: "card-footer",
                    span { class: "text-muted", "Page {dashboard.current_page()} of {dashboard.total_pages()}" }
                    Pagination {
                        current: dashboard.current_page(),
                        total_pages: dashboard.total_pages(),
                        window: dashboard.page_window().collect::<Vec<_>>(),
                        on_go: move |page| model.write().go_to_page(page),
                    }
                }
            }
        }
    }
}
