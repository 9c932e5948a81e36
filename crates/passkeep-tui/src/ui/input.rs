//! Key handling for the passkeep TUI.
//!
//! Network operations are awaited inline; the operations issued by one
//! key press run in written order.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen, LOGIN_FIELDS, REGISTER_FIELDS};

pub async fn handle_key(app: &mut App, key: KeyEvent) {
    // An open save dialog captures all input.
    if app.save_name.is_some() {
        handle_save_dialog(app, key).await;
        return;
    }

    match app.screen {
        Screen::Login => handle_login(app, key).await,
        Screen::Register => handle_register(app, key).await,
        Screen::Generator | Screen::Vault | Screen::History => handle_main(app, key).await,
    }
}

async fn handle_login(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab | KeyCode::Down => {
            app.login.focus = (app.login.focus + 1) % LOGIN_FIELDS;
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login.focus = (app.login.focus + LOGIN_FIELDS - 1) % LOGIN_FIELDS;
        }
        KeyCode::Enter => {
            if app.login.focus + 1 < LOGIN_FIELDS {
                app.login.focus += 1;
            } else {
                app.submit_login().await;
            }
        }
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.screen = Screen::Register;
        }
        KeyCode::Backspace => {
            login_field_mut(app).pop();
        }
        KeyCode::Char(c) => {
            login_field_mut(app).push(c);
        }
        _ => {}
    }
}

fn login_field_mut(app: &mut App) -> &mut String {
    match app.login.focus {
        0 => &mut app.login.email,
        _ => &mut app.login.password,
    }
}

async fn handle_register(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.screen = Screen::Login,
        KeyCode::Tab | KeyCode::Down => {
            app.register.focus = (app.register.focus + 1) % REGISTER_FIELDS;
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.register.focus = (app.register.focus + REGISTER_FIELDS - 1) % REGISTER_FIELDS;
        }
        KeyCode::Enter => {
            if app.register.focus + 1 < REGISTER_FIELDS {
                app.register.focus += 1;
            } else {
                app.submit_register().await;
            }
        }
        KeyCode::Backspace => {
            register_field_mut(app).pop();
        }
        KeyCode::Char(c) => {
            register_field_mut(app).push(c);
        }
        _ => {}
    }
}

fn register_field_mut(app: &mut App) -> &mut String {
    match app.register.focus {
        0 => &mut app.register.name,
        1 => &mut app.register.email,
        2 => &mut app.register.birth_date,
        3 => &mut app.register.password,
        _ => &mut app.register.confirm,
    }
}

async fn handle_main(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') => app.screen = Screen::Generator,
        KeyCode::Char('2') => {
            app.screen = Screen::Vault;
            // The vault is never assumed fresh on entry.
            app.refresh_vault().await;
        }
        KeyCode::Char('3') => app.screen = Screen::History,
        KeyCode::Char('o') => app.logout(),
        KeyCode::Char('g') if app.screen == Screen::Generator => app.generate(),
        KeyCode::Char('s') if app.screen == Screen::Generator => app.open_save_dialog(),
        KeyCode::Char('r') if app.screen == Screen::Vault => app.refresh_vault().await,
        KeyCode::Char('d') if app.screen == Screen::Vault => app.delete_selected().await,
        KeyCode::Up if app.screen == Screen::Vault => app.select_previous(),
        KeyCode::Down if app.screen == Screen::Vault => app.select_next(),
        KeyCode::Char('x') if app.screen == Screen::History => app.clear_history(),
        _ => {}
    }
}

async fn handle_save_dialog(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.save_name = None,
        KeyCode::Enter => app.submit_save().await,
        KeyCode::Backspace => {
            if let Some(name) = app.save_name.as_mut() {
                name.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(name) = app.save_name.as_mut() {
                name.push(c);
            }
        }
        _ => {}
    }
}
