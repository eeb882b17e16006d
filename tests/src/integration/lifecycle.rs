//! # System Lifecycle Tests
//!
//! The wrapper's state machine exercised the way a real game system uses
//! it: subscriptions created in the setup hook, guarded methods, and the
//! teardown safety net.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared_bus::{
        EventBus, EventType, GameEvent, GameSystem, HandlerOutcome, SubscribeOptions, SystemBase,
    };
    use shared_types::{LayerId, ScrewColor, ScrewId, ShapeId, SystemError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A miniature screw-collection system: counts unfastened screws and
    /// announces layer completion, all through the wrapper.
    struct CollectionSystem {
        base: SystemBase,
        collected: Arc<AtomicUsize>,
        teardown_calls: AtomicUsize,
    }

    impl CollectionSystem {
        fn new(bus: EventBus) -> Arc<Self> {
            Arc::new(Self {
                base: SystemBase::new("screw-collection", bus),
                collected: Arc::new(AtomicUsize::new(0)),
                teardown_calls: AtomicUsize::new(0),
            })
        }

        fn collected_count(&self) -> Option<usize> {
            self.base
                .execute_if_active("collected_count", || self.collected.load(Ordering::SeqCst))
        }
    }

    #[async_trait]
    impl GameSystem for CollectionSystem {
        fn base(&self) -> &SystemBase {
            &self.base
        }

        async fn on_init(&self) -> Result<(), SystemError> {
            let collected = self.collected.clone();
            self.base.subscribe(
                EventType::ScrewUnfastened,
                move |_| {
                    collected.fetch_add(1, Ordering::SeqCst);
                    Ok(HandlerOutcome::Completed)
                },
                SubscribeOptions::default(),
            )?;
            Ok(())
        }

        async fn on_teardown(&self) -> Result<(), SystemError> {
            self.teardown_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn unfasten(screw: u64) -> GameEvent {
        GameEvent::ScrewUnfastened {
            screw: ScrewId(screw),
            shape: ShapeId(1),
            color: ScrewColor::Orange,
        }
    }

    #[tokio::test]
    async fn system_reacts_only_while_active() {
        let bus = EventBus::new();
        let system = CollectionSystem::new(bus.clone());

        // Uninitialized: the guard refuses and no subscription exists.
        assert_eq!(system.collected_count(), None);
        bus.emit(unfasten(1));

        system.initialize().await.unwrap();
        bus.emit(unfasten(2));
        bus.emit(unfasten(3));
        assert_eq!(system.collected_count(), Some(2));

        system.destroy().await.unwrap();
        bus.emit(unfasten(4));
        assert_eq!(system.collected_count(), None);
        assert_eq!(bus.subscription_count(), 0);
    }

    #[tokio::test]
    async fn double_destroy_is_a_warned_noop() {
        let bus = EventBus::new();
        let system = CollectionSystem::new(bus.clone());
        system.initialize().await.unwrap();

        system.destroy().await.unwrap();
        let count_after_first = bus.subscription_count();

        // Second destroy: no error, no double-removal, one teardown.
        system.destroy().await.unwrap();
        assert_eq!(system.teardown_calls.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscription_count(), count_after_first);
        assert!(system.system_info().destroyed);
    }

    #[tokio::test]
    async fn destroyed_system_subscribe_is_a_contract_violation() {
        let bus = EventBus::new();
        let system = CollectionSystem::new(bus);
        system.initialize().await.unwrap();
        system.destroy().await.unwrap();

        let result = system.base().subscribe(
            EventType::ScrewUnfastened,
            |_| Ok(HandlerOutcome::Completed),
            SubscribeOptions::default(),
        );
        assert!(matches!(result, Err(SystemError::Destroyed { .. })));
    }

    #[tokio::test]
    async fn unsubscribe_source_removes_all_and_only_that_source() {
        let bus = EventBus::new();
        let system = CollectionSystem::new(bus.clone());
        system.initialize().await.unwrap();

        // Another party subscribed under its own name.
        bus.subscribe(
            EventType::ScrewUnfastened,
            |_| Ok(HandlerOutcome::Completed),
            SubscribeOptions::default().from_source("audio"),
        );
        // And one more under the collection system's name, outside its
        // id tracking.
        bus.subscribe(
            EventType::LayerCleared,
            |_| Ok(HandlerOutcome::Completed),
            SubscribeOptions::default().from_source("screw-collection"),
        );

        assert_eq!(bus.unsubscribe_source("screw-collection"), 2);
        assert_eq!(bus.subscription_count(), 1);
        assert_eq!(bus.unsubscribe_source("screw-collection"), 0);
    }

    #[tokio::test]
    async fn destroy_sweeps_stray_source_subscriptions() {
        let bus = EventBus::new();
        let system = CollectionSystem::new(bus.clone());
        system.initialize().await.unwrap();

        // A subscription registered under the system's name but not
        // through its base; the destroy safety net removes it too.
        bus.subscribe(
            EventType::LayerCleared,
            |_| Ok(HandlerOutcome::Completed),
            SubscribeOptions::default().from_source("screw-collection"),
        );
        assert_eq!(bus.subscription_count(), 2);

        system.destroy().await.unwrap();
        assert_eq!(bus.subscription_count(), 0);
    }

    #[tokio::test]
    async fn emitted_events_carry_the_system_name() {
        let bus = EventBus::new();
        let system = CollectionSystem::new(bus.clone());
        system.initialize().await.unwrap();

        let sources: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let sources_in_handler = sources.clone();
        bus.subscribe(
            EventType::LayerCleared,
            move |envelope| {
                sources_in_handler.lock().push(envelope.source.clone());
                Ok(HandlerOutcome::Completed)
            },
            SubscribeOptions::default().from_source("audio"),
        );

        system
            .base()
            .emit(GameEvent::LayerCleared { layer: LayerId(0) });
        assert_eq!(
            sources.lock().as_slice(),
            &[Some("screw-collection".to_owned())]
        );
    }
}
