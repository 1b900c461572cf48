use dioxus::prelude::*;
use types::{Error, LoginRequest};

use crate::{Route, browser, use_app_name};

#[component]
pub fn Login(error: Option<String>) -> Element {
    let mut username = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut submitting = use_signal(|| false);
    let mut failure = use_signal(|| None::<String>);
    let title = use_app_name();
    let notice = failure.read().clone().or(error);
    let can_submit = !username.read().is_empty() && !password.read().is_empty() && !submitting();

    rsx! {
        div { class: "login-page",
            div { class: "login-card",
                div { class: "login-header",
                    h1 { class: "login-title", "{title}" }
                    p { class: "login-subtitle", "Sign in to manage users and subscriptions" }
                }
                if let Some(message) = notice {
                    div { class: "alert alert-error", "{message}" }
                }
                form {
                    onsubmit: move |evt: FormEvent| {
                        evt.prevent_default();
                        spawn(async move {
                            submitting.set(true);
                            failure.set(None);
                            let request = LoginRequest {
                                username: username(),
                                password: password(),
                            };
                            match browser::login(&request).await {
                                Ok(()) => {
                                    navigator().push(Route::Dashboard {});
                                }
                                Err(Error::Auth) => {
                                    failure.set(Some(Error::Auth.to_string()));
                                }
                                Err(error) => {
                                    tracing::warn!(%error, "login request failed");
                                    failure.set(Some(error.to_string()));
                                }
                            }
                            submitting.set(false);
                        });
                    },
                    div { class: "form-group",
                        label { class: "form-label", r#for: "username", "Username" }
                        input {
                            id: "username",
                            class: "form-input",
                            r#type: "text",
                            autocomplete: "username",
                            disabled: submitting(),
                            value: "{username}",
                            oninput: move |e| username.set(e.value()),
                        }
                    }
                    div { class: "form-group",
                        label { class: "form-label", r#for: "password", "Password" }
                        input {
                            id: "password",
                            class: "form-input",
                            r#type: "password",
                            autocomplete: "current-password",
                            disabled: submitting(),
                            value: "{password}",
                            oninput: move |e| password.set(e.value()),
                        }
                    }
                    button {
                        r#type: "submit",
                        class: "btn btn-primary login-btn",
                        disabled: !can_submit,
                        if submitting() { "Signing in..." } else { "Sign in" }
                    }
                }
            }
        }
    }
}
