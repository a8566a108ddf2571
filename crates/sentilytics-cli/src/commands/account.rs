use anyhow::{Result, bail};
use sentilytics_core::session::Session;

use super::Output;
use crate::bootstrap::App;

pub async fn register(
    app: &App,
    output: &Output,
    name: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    match app.store.register(name, email, password).await {
        Ok(session) => print_session(output, &session, "Registered and signed in"),
        Err(e) if app.store.pending_registration().is_some() => {
            bail!("Account created, but signing in failed: {e}. Run `sentilytics login` to retry.")
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login(app: &App, output: &Output, email: &str, password: &str) -> Result<()> {
    let session = app.store.login(email, password).await?;
    print_session(output, &session, "Signed in")
}

pub async fn logout(app: &App, output: &Output) -> Result<()> {
    app.store.logout().await;
    output.emit(&app.store.session(), || println!("Signed out"))
}

pub fn whoami(app: &App, output: &Output) -> Result<()> {
    let session = app.store.session();
    output.emit(&session, || match session.user() {
        Some(user) => println!("{} <{}> (id {})", user.name, user.email, user.id),
        None => println!("Not signed in"),
    })
}

fn print_session(output: &Output, session: &Session, headline: &str) -> Result<()> {
    output.emit(session, || {
        if let Some(user) = session.user() {
            println!("{headline} as {} <{}>", user.name, user.email);
        }
    })
}
