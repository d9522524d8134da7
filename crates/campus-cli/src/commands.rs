//! Subcommand implementations.

use std::sync::Arc;

use campus_common::{
    CampusError, CreatePost, FeedUpdate, Result, ServerEvent, Toast, ToastQueue,
};
use campus_config::CampusConfig;
use campus_realtime::{
    ConnectionManager, ConnectionState, FeedSubscriber, NotificationApi, NotificationCenter,
    NotificationSubscriber, RealtimeError, RealtimeHandle, RestClient, SessionIdentity,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::cli::{Args, Command};
use crate::settings::{api_timeout, realtime_config};

pub async fn run(args: Args, config: CampusConfig) -> Result<()> {
    let rest = RestClient::new(config.api.base_url.clone(), api_timeout(&config))?;

    match &args.command {
        Command::Notifications { mark_all_read } => {
            let user_id = require_user(&args.user)?;
            list_notifications(&rest, user_id, *mark_all_read).await
        }
        Command::Watch => {
            let identity = resolve_identity(&args, &rest).await?;
            watch(&config, &rest, &identity).await
        }
        Command::Post {
            department,
            image,
            content,
        } => {
            let identity = resolve_identity(&args, &rest).await?;
            let (_manager, handle) = connect(&config, &identity).await?;
            let draft = CreatePost {
                content: content.clone(),
                department: department.clone(),
                image: image.clone(),
            };
            report("Could not publish post", handle.create_post(draft).await)
        }
        Command::Like { post_id } => {
            let identity = resolve_identity(&args, &rest).await?;
            let (_manager, handle) = connect(&config, &identity).await?;
            report("Could not like post", handle.like_post(post_id).await)
        }
        Command::Comment { post_id, content } => {
            let identity = resolve_identity(&args, &rest).await?;
            let (_manager, handle) = connect(&config, &identity).await?;
            report("Could not add comment", handle.add_comment(post_id, content).await)
        }
    }
}

fn require_user(user: &Option<String>) -> Result<&str> {
    user.as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| CampusError::Other("--user is required".into()))
}

async fn resolve_identity(args: &Args, rest: &RestClient) -> Result<SessionIdentity> {
    let user_id = require_user(&args.user)?;
    let identity = if args.fetch_profile {
        let profile = rest.fetch_profile(user_id).await?;
        SessionIdentity::from_profile(&profile)
    } else {
        SessionIdentity::new(user_id, user_id)
    };
    Ok(match &args.token {
        Some(token) => identity.with_access_token(token.clone()),
        None => identity,
    })
}

/// Sign in and wait until the relay accepts the session.
async fn connect(
    config: &CampusConfig,
    identity: &SessionIdentity,
) -> Result<(ConnectionManager, RealtimeHandle)> {
    let rt = realtime_config(config);
    let wait = rt.connect_timeout();
    let mut manager = ConnectionManager::new(rt);
    let mut states = manager.watch_state();
    manager.sign_in(identity);

    match tokio::time::timeout(wait, states.wait_for(|s| s.is_connected())).await {
        Ok(Ok(_)) => {}
        _ => {
            return Err(CampusError::Network(format!(
                "could not reach relay at {} within {wait:?}",
                config.realtime.url
            )))
        }
    }

    let handle = manager
        .handle()
        .ok_or_else(|| CampusError::Realtime("connection closed".into()))?;
    Ok((manager, handle))
}

/// Print the acknowledgement, or the failure as an error toast.
fn report<T: serde::Serialize>(title: &str, outcome: std::result::Result<T, RealtimeError>) -> Result<()> {
    match outcome {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            print_toast(&e.to_toast(title));
            Err(e.into())
        }
    }
}

fn print_toast(toast: &Toast) {
    eprintln!("{toast}");
}

async fn list_notifications(rest: &RestClient, user_id: &str, mark_all_read: bool) -> Result<()> {
    let items = rest.list_notifications(user_id).await?;
    for n in &items {
        let marker = if n.is_read { " " } else { "*" };
        println!(
            "{marker} {} [{}] {}",
            n.created_at.format("%Y-%m-%d %H:%M"),
            n.kind.as_str(),
            n.content
        );
    }
    if items.is_empty() {
        println!("No notifications.");
    }
    if mark_all_read {
        rest.mark_all_notifications_read(user_id).await?;
        println!("Marked all read.");
    }
    Ok(())
}

async fn watch(config: &CampusConfig, rest: &RestClient, identity: &SessionIdentity) -> Result<()> {
    let mut manager = ConnectionManager::new(realtime_config(config));
    let mut states = manager.watch_state();
    manager.sign_in(identity);
    let handle = manager
        .handle()
        .ok_or_else(|| CampusError::Realtime("connection closed".into()))?;

    let center = NotificationCenter::new(identity.user_id.clone(), Arc::new(rest.clone()));
    if let Err(e) = center.load().await {
        warn!(error = %e, "Could not load notifications; continuing with pushes only");
    }

    let toasts = Arc::new(Mutex::new(ToastQueue::new(config.toasts.capacity as usize)));
    let mut feed = FeedSubscriber::default();
    let mut inbox = NotificationSubscriber::new(center.state(), Arc::clone(&toasts));
    feed.attach(&handle);
    inbox.attach(&handle);
    let mut events = handle.subscribe();
    let mut inbox_changes = inbox.changes();

    info!(user_id = %identity.user_id, "Watching feed; Ctrl-C to stop");
    let mut last_state = *states.borrow();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                println!("-- connection: {state:?}");
                if let Some(toast) = connection_toast(last_state, state) {
                    print_toast(&toast);
                }
                last_state = state;
            }
            event = events.recv() => match event {
                Some(ServerEvent::FeedUpdate(update)) => print_update(&update),
                // Printed from the toast queue once the inbox has recorded it.
                Some(ServerEvent::Notification(_)) => {}
                None => break,
            },
            Ok(()) = inbox_changes.changed() => {
                for toast in toasts.lock().await.drain() {
                    print_toast(&toast);
                }
            }
        }
    }

    feed.detach();
    inbox.detach();
    manager.sign_out();
    println!(
        "-- {} posts seen, {} unread notifications",
        feed.posts().await.len(),
        center.unread_count().await
    );
    Ok(())
}

/// A warning when a live session drops and the client starts retrying.
fn connection_toast(previous: ConnectionState, current: ConnectionState) -> Option<Toast> {
    match (previous, current) {
        (ConnectionState::Connected, ConnectionState::Connecting) => Some(Toast::warning(
            "Connection lost",
            "Reconnecting to the campus relay",
        )),
        _ => None,
    }
}

fn print_update(update: &FeedUpdate) {
    match update {
        FeedUpdate::NewPost { post } => {
            println!("+ post {} by {} [{}]: {}", post.id, post.author_name, post.department, post.content)
        }
        FeedUpdate::NewComment { post_id, comment } => {
            println!("+ comment on {post_id} by {}: {}", comment.author_name, comment.content)
        }
        FeedUpdate::NewLike { post_id } => println!("+ like on {post_id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_common::ToastLevel;

    #[test]
    fn dropped_session_raises_warning() {
        let toast = connection_toast(ConnectionState::Connected, ConnectionState::Connecting)
            .expect("warning on drop");
        assert_eq!(toast.level, ToastLevel::Warning);
        assert_eq!(toast.title, "Connection lost");
    }

    #[test]
    fn other_transitions_are_quiet() {
        for (previous, current) in [
            (ConnectionState::Disconnected, ConnectionState::Connecting),
            (ConnectionState::Connecting, ConnectionState::Connected),
            (ConnectionState::Connected, ConnectionState::Disconnected),
        ] {
            assert!(connection_toast(previous, current).is_none());
        }
    }
}
