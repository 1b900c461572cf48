use dioxus::prelude::*;

mod browser;
mod views;

use views::{Dashboard, Login};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/login?:error")]
    Login { error: Option<String> },
    #[layout(AuthenticatedLayout)]
        #[route("/")]
        Dashboard {},
}

fn main() {
    #[cfg(feature = "server")]
    {
        server::init_tracing();
        dioxus::serve(|| async move {
            let routes = server::init().await?;

            Ok(dioxus::server::router(App).merge(routes))
        });
    }

    #[cfg(all(feature = "web", not(feature = "server")))]
    dioxus::launch(App);
}

/// The configured display name, fetched once by [`App`].
#[derive(Clone, Copy)]
struct AppName(Resource<ServerFnResult<String>>);

pub fn use_app_name() -> String {
    let AppName(app_name) = use_context::<AppName>();
    match &*app_name.read() {
        Some(Ok(name)) => name.clone(),
        _ => "Admin".to_string(),
    }
}

#[component]
fn App() -> Element {
    let app_name = use_server_future(api::app_name)?;
    use_context_provider(|| AppName(app_name));
    let title = use_app_name();

    rsx! {
        document::Title { "{title}" }
        document::Link { rel: "icon", href: asset!("/assets/favicon.svg") }
        document::Link { rel: "stylesheet", href: asset!("/assets/main.css") }

        Router::<Route> {}
    }
}

#[component]
fn NavLink(to: Route, children: Element) -> Element {
    let current_route: Route = use_route();
    let is_active = current_route == to;

    rsx! {
        Link {
            to,
            class: if is_active { "active" },
            {children}
        }
    }
}

/// Error information for the banner.
#[derive(Clone, Debug, Default)]
pub struct ErrorInfo {
    pub message: String,
    pub code: Option<u16>,
}

impl ErrorInfo {
    /// Recover our own error type from the server function error, falling
    /// back to whatever message it carries.
    pub fn from_server_error(err: &ServerFnError) -> Self {
        match err {
            ServerFnError::ServerError {
                message,
                details,
                code,
                ..
            } => {
                let message = details
                    .clone()
                    .and_then(|d| serde_json::from_value::<types::Error>(d).ok())
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| message.clone());
                Self {
                    message,
                    code: Some(*code),
                }
            }
            other => Self {
                message: other.to_string(),
                code: None,
            },
        }
    }
}

/// Global error state - use `use_error()` to access
#[derive(Clone, Copy)]
pub struct ErrorState(Signal<Option<ErrorInfo>>);

impl ErrorState {
    pub fn set_server_error(&mut self, err: &ServerFnError) {
        // Session expired or was revoked
        if let ServerFnError::ServerError { code: 401, .. } = err {
            navigator().push(Route::Login {
                error: Some("Your session has expired. Please sign in again.".to_string()),
            });
            return;
        }
        tracing::warn!(%err, "server function failed");
        self.0.set(Some(ErrorInfo::from_server_error(err)));
    }

    pub fn clear(&mut self) {
        self.0.set(None);
    }
}

/// Get the global error state for setting/clearing errors
pub fn use_error() -> ErrorState {
    use_context::<ErrorState>()
}

#[component]
fn ErrorBanner() -> Element {
    let mut error_state = use_context::<ErrorState>();
    let error = error_state.0.read();

    if let Some(err) = error.as_ref() {
        rsx! {
            div { class: "error-banner",
                div { class: "error-banner-content",
                    div { class: "error-banner-header",
                        span { class: "error-banner-message",
                            "Could not complete the request: {err.message}"
                        }
                        if let Some(code) = err.code {
                            span { class: "error-banner-code", "({code})" }
                        }
                        div { class: "error-banner-actions",
                            button {
                                class: "error-banner-close",
                                onclick: move |_| error_state.clear(),
                                "×"
                            }
                        }
                    }
                }
            }
        }
    } else {
        rsx! {}
    }
}

#[component]
fn AuthenticatedLayout() -> Element {
    let session = use_server_future(api::get_current_session)?;
    let app_name = use_app_name();

    match &*session.read() {
        Some(Ok(Some(session))) => {
            let username = session.username.clone();
            use_context_provider(|| ErrorState(Signal::new(None)));
            let initial = username
                .chars()
                .next()
                .unwrap_or('?')
                .to_uppercase()
                .to_string();

            rsx! {
                div { class: "app-layout",
                    // Sidebar
                    aside { class: "sidebar",
                        div { class: "sidebar-header",
                            span { class: "sidebar-logo", "{app_name}" }
                        }
                        nav { class: "sidebar-nav",
                            NavLink { to: Route::Dashboard {}, "Dashboard" }
                        }
                        div { class: "sidebar-footer",
                            div { class: "sidebar-user",
                                div { class: "sidebar-avatar", "{initial}" }
                                div { class: "sidebar-user-info",
                                    div { class: "sidebar-user-name", "{username}" }
                                    div { class: "sidebar-user-role", "Administrator" }
                                }
                            }
                            a { href: "/auth/logout", rel: "external", class: "sidebar-logout", "Sign out" }
                        }
                    }
                    // Main content
                    main { class: "main-content",
                        ErrorBanner {}
                        Outlet::<Route> {}
                    }
                }
            }
        }
        Some(Ok(None)) | Some(Err(_)) => {
            let nav = navigator();
            nav.push(Route::Login { error: None });
            rsx! {
                div { class: "loading", "Redirecting to login..." }
            }
        }
        None => {
            rsx! {
                div { class: "loading", "Loading..." }
            }
        }
    }
}
