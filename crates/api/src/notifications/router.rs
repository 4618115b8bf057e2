//! Event-to-notification routing engine.

use std::sync::Arc;

use mineruca_core::notification::{
    RefreshFrame, RefreshScope, KIND_FOLLOW_ACCEPTED, KIND_FOLLOW_REQUEST,
};
use mineruca_core::types::DbId;
use mineruca_db::models::notification::CreateNotification;
use mineruca_db::repositories::{FollowRepo, NotificationRepo};
use mineruca_db::DbPool;
use mineruca_events::{event_types, DomainEvent};
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Who hears about an event, and how.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Delivery {
    /// `(recipient, kind)` notification rows to persist.
    pub notify: Vec<(DbId, &'static str)>,
    /// `(recipient, scope)` refresh frames to push.
    pub refresh: Vec<(DbId, RefreshScope)>,
    /// Push a timeline refresh to the actor's accepted followers.
    pub refresh_followers_timeline: bool,
}

/// Decide the delivery for an event without touching the database.
pub fn plan_delivery(event: &DomainEvent) -> Delivery {
    let actor = event.actor_user_id;
    let target = event.target_user_id;
    let mut plan = Delivery::default();

    match event.event_type.as_str() {
        event_types::FOLLOW_REQUESTED => {
            if let Some(target) = target {
                plan.notify.push((target, KIND_FOLLOW_REQUEST));
                plan.refresh.push((target, RefreshScope::Notifications));
                plan.refresh.push((target, RefreshScope::Follows));
            }
        }
        event_types::FOLLOW_ACCEPTED => {
            // Target is the follower whose request was accepted.
            if let Some(target) = target {
                plan.notify.push((target, KIND_FOLLOW_ACCEPTED));
                plan.refresh.push((target, RefreshScope::Notifications));
                plan.refresh.push((target, RefreshScope::Follows));
                plan.refresh.push((target, RefreshScope::Timeline));
            }
            if let Some(actor) = actor {
                plan.refresh.push((actor, RefreshScope::Follows));
            }
        }
        event_types::FOLLOW_REMOVED => {
            if let Some(target) = target {
                plan.refresh.push((target, RefreshScope::Follows));
            }
            if let Some(actor) = actor {
                plan.refresh.push((actor, RefreshScope::Follows));
                plan.refresh.push((actor, RefreshScope::Timeline));
            }
        }
        event_types::SHARE_CREATED | event_types::SHARE_REVOKED => {
            if let Some(actor) = actor {
                plan.refresh.push((actor, RefreshScope::Shares));
            }
        }
        t if event_types::is_restaurant_event(t) => {
            if let Some(actor) = actor {
                plan.refresh.push((actor, RefreshScope::Restaurants));
                plan.refresh_followers_timeline = true;
            }
        }
        _ => {}
    }

    plan
}

/// Routes domain events to notification rows and WebSocket refresh frames.
pub struct NotificationRouter {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>) -> Self {
        Self { pool, ws_manager }
    }

    /// Run until the event bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Persist notifications and push refresh frames for one event.
    pub async fn route_event(&self, event: &DomainEvent) -> Result<(), sqlx::Error> {
        let plan = plan_delivery(event);

        for (user_id, kind) in &plan.notify {
            let input = CreateNotification {
                user_id: *user_id,
                actor_id: event.actor_user_id,
                kind: kind.to_string(),
                entity_id: event.entity_id,
                payload: event.payload.clone(),
            };
            NotificationRepo::create(&self.pool, &input).await?;
        }

        for (user_id, scope) in &plan.refresh {
            self.ws_manager
                .send_refresh(&[*user_id], &RefreshFrame::new(*scope))
                .await;
        }

        if plan.refresh_followers_timeline {
            if let Some(actor) = event.actor_user_id {
                let followers = FollowRepo::follower_ids(&self.pool, actor).await?;
                if !followers.is_empty() {
                    let sent = self
                        .ws_manager
                        .send_refresh(&followers, &RefreshFrame::new(RefreshScope::Timeline))
                        .await;
                    tracing::debug!(
                        actor,
                        followers = followers.len(),
                        sent,
                        "Pushed timeline refresh"
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_request_notifies_followee() {
        let event = DomainEvent::new(event_types::FOLLOW_REQUESTED)
            .with_actor(1)
            .with_target(2);
        let plan = plan_delivery(&event);
        assert_eq!(plan.notify, vec![(2, KIND_FOLLOW_REQUEST)]);
        assert!(plan.refresh.contains(&(2, RefreshScope::Notifications)));
        assert!(!plan.refresh_followers_timeline);
    }

    #[test]
    fn accepted_follow_notifies_follower_and_refreshes_both() {
        let event = DomainEvent::new(event_types::FOLLOW_ACCEPTED)
            .with_actor(2)
            .with_target(1);
        let plan = plan_delivery(&event);
        assert_eq!(plan.notify, vec![(1, KIND_FOLLOW_ACCEPTED)]);
        assert!(plan.refresh.contains(&(1, RefreshScope::Timeline)));
        assert!(plan.refresh.contains(&(2, RefreshScope::Follows)));
    }

    #[test]
    fn restaurant_change_refreshes_owner_and_followers() {
        let event = DomainEvent::new(event_types::RESTAURANT_UPDATED).with_actor(5);
        let plan = plan_delivery(&event);
        assert!(plan.notify.is_empty());
        assert_eq!(plan.refresh, vec![(5, RefreshScope::Restaurants)]);
        assert!(plan.refresh_followers_timeline);
    }

    #[test]
    fn unknown_events_deliver_nothing() {
        assert_eq!(plan_delivery(&DomainEvent::new("other.thing")), Delivery::default());
    }
}
