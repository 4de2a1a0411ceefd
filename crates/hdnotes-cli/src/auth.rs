//! Interactive signup and login.
//!
//! Both commands drive a `CredentialFlow` from the prompt: credentials,
//! then the emailed code. A login for an unknown email continues as a
//! signup with the address filled in.

use anyhow::{bail, Result};
use chrono::Local;
use hdnotes_core::flow::{
    CredentialFlow, CredentialForm, LoginFlow, LoginForm, SignupFlow, SignupForm, OTP_LENGTH,
};
use hdnotes_core::models::User;
use tracing::info;

use crate::app::App;
use crate::prompt::{confirm, prompt, prompt_password, prompt_with_default};

enum Outcome {
    SignedIn(User),
    /// Login found no account; signup picks up with the email filled in.
    Redirect {
        signup: SignupFlow,
        form: SignupForm,
        message: String,
    },
    Cancelled,
}

enum VerifyOutcome<F> {
    Verified(User),
    Back(F),
    Cancelled,
}

pub async fn login(app: &mut App, email: Option<String>) -> Result<()> {
    println!("\n=== HD Notes Login ===\n");

    let initial = LoginForm {
        email: email
            .or_else(|| app.config.last_email.clone())
            .unwrap_or_default(),
        password: String::new(),
    };

    match drive(app, LoginFlow::new(), initial, prompt_login).await? {
        Outcome::SignedIn(user) => {
            signed_in(app, &user);
            Ok(())
        }
        Outcome::Redirect {
            signup,
            form,
            message,
        } => {
            println!("\n{}", message);
            println!("Continuing to sign up as {}.", form.email);
            run_signup(app, signup, form).await
        }
        Outcome::Cancelled => {
            println!("Login cancelled.");
            Ok(())
        }
    }
}

pub async fn signup(app: &mut App, email: Option<String>) -> Result<()> {
    let initial = SignupForm::prefilled(email.unwrap_or_default());
    run_signup(app, SignupFlow::new(), initial).await
}

async fn run_signup(app: &mut App, flow: SignupFlow, initial: SignupForm) -> Result<()> {
    println!("\n=== HD Notes Sign Up ===\n");

    match drive(app, flow, initial, prompt_signup).await? {
        Outcome::SignedIn(user) => {
            signed_in(app, &user);
            Ok(())
        }
        // Signup never redirects; treat it like any other failure.
        Outcome::Redirect { message, .. } => bail!("{}", message),
        Outcome::Cancelled => {
            println!("Sign up cancelled.");
            Ok(())
        }
    }
}

/// Sign in with an ID token obtained from Google.
pub async fn google(app: &mut App, credential: Option<String>, new_account: bool) -> Result<()> {
    let credential = match credential {
        Some(credential) => credential,
        None => prompt_password("Google ID token")?,
    };

    let result = if new_account {
        SignupFlow::new()
            .oauth(&app.api, &app.session, &credential)
            .await
    } else {
        LoginFlow::new()
            .oauth(&app.api, &app.session, &credential)
            .await
    };

    match result {
        Ok(user) => {
            signed_in(app, &user);
            Ok(())
        }
        Err(e) => bail!("{}", e.user_message()),
    }
}

pub fn logout(app: &App) {
    if app.session.is_authenticated() {
        app.session.logout();
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
}

pub fn whoami(app: &App) {
    match app.session.current() {
        Some(session) => {
            println!("{} <{}>", session.user.display_name(), session.user.email);
            println!(
                "Session expires {}",
                session.expires_at.with_timezone(&Local).format("%b %d, %Y %H:%M")
            );
        }
        None => println!("Not signed in."),
    }
}

fn signed_in(app: &mut App, user: &User) {
    info!(user_id = %user.id, "Signed in");
    if !user.email.is_empty() {
        app.remember_email(&user.email);
    }
    println!("\nWelcome, {}!\n", user.display_name());
}

/// Run one flow from the credentials prompt until a session exists, the
/// user gives up, or the server redirects to the other flow.
async fn drive<F: CredentialForm>(
    app: &App,
    mut flow: CredentialFlow<F>,
    initial: F,
    prompt_form: fn(&F) -> Result<F>,
) -> Result<Outcome> {
    let mut form = prompt_form(&initial)?;

    loop {
        println!("\nSending verification code...");
        match flow.submit(&app.api, form.clone()).await {
            Ok(ack) => println!("{}", ack),
            Err(e) => {
                if let Some((signup, form)) = flow.continue_as_signup(&e) {
                    return Ok(Outcome::Redirect {
                        signup,
                        form,
                        message: e.user_message(),
                    });
                }
                eprintln!("{}", e.user_message());
                if !confirm("Try again?", true)? {
                    return Ok(Outcome::Cancelled);
                }
                form = prompt_form(&form)?;
                continue;
            }
        }

        match verify(app, &mut flow).await? {
            VerifyOutcome::Verified(user) => return Ok(Outcome::SignedIn(user)),
            VerifyOutcome::Back(previous) => form = prompt_form(&previous)?,
            VerifyOutcome::Cancelled => return Ok(Outcome::Cancelled),
        }
    }
}

async fn verify<F: CredentialForm>(
    app: &App,
    flow: &mut CredentialFlow<F>,
) -> Result<VerifyOutcome<F>> {
    println!(
        "Enter the {}-digit code from your email ([r]esend, [b]ack, [q]uit).",
        OTP_LENGTH
    );

    loop {
        let input = prompt("Code")?;
        match input.to_lowercase().as_str() {
            "r" | "resend" => match flow.resend(&app.api).await {
                Ok(message) => println!("{}", message),
                Err(e) => eprintln!("{}", e.user_message()),
            },
            "b" | "back" => {
                if let Some(form) = flow.back() {
                    return Ok(VerifyOutcome::Back(form));
                }
            }
            "q" | "quit" => return Ok(VerifyOutcome::Cancelled),
            code => {
                flow.set_otp_input(code);
                if !flow.can_verify() {
                    eprintln!("The code must be {} digits.", OTP_LENGTH);
                    continue;
                }
                println!("Verifying...");
                match flow.verify(&app.api, &app.session).await {
                    Ok(user) => return Ok(VerifyOutcome::Verified(user)),
                    Err(e) => eprintln!("{}", e.user_message()),
                }
            }
        }
    }
}

fn prompt_login(previous: &LoginForm) -> Result<LoginForm> {
    Ok(LoginForm {
        email: prompt_with_default("Email", &previous.email)?,
        password: prompt_password("Password")?,
    })
}

fn prompt_signup(previous: &SignupForm) -> Result<SignupForm> {
    Ok(SignupForm {
        username: prompt_with_default("Username", &previous.username)?,
        email: prompt_with_default("Email", &previous.email)?,
        dob: prompt_with_default("Date of birth (YYYY-MM-DD)", &previous.dob)?,
        password: prompt_password("Password")?,
        confirm_password: prompt_password("Confirm password")?,
    })
}
