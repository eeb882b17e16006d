//! # Event Stream Tests
//!
//! Stream consumption the way UI panels use it, including combinator
//! compatibility and unsubscribe-on-drop.

#[cfg(test)]
mod tests {
    use shared_bus::{EventBus, EventType, GameEvent};
    use shared_types::{LayerId, LevelId};
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn stream_works_with_combinators() {
        let bus = EventBus::new();
        let stream = bus.stream(EventType::LayerUnlocked, 16);

        for layer in 0..4 {
            bus.emit(GameEvent::LayerUnlocked {
                layer: LayerId(layer),
            });
        }

        let layers: Vec<u8> = stream
            .take(4)
            .map(|envelope| match envelope.event {
                GameEvent::LayerUnlocked { layer } => layer.0,
                _ => unreachable!(),
            })
            .collect()
            .await;
        assert_eq!(layers, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn dropping_the_stream_releases_its_subscription() {
        let bus = EventBus::new();
        let stream = bus.stream(EventType::SaveCompleted, 4);
        assert_eq!(bus.subscription_count(), 1);

        drop(stream);
        assert_eq!(bus.subscription_count(), 0);

        // Emitting afterwards reaches nobody.
        let invoked = bus.emit(GameEvent::SaveCompleted {
            level: LevelId::new("workshop-02"),
            bytes: 512,
        });
        assert_eq!(invoked, 0);
    }

    #[tokio::test]
    async fn streams_and_handlers_coexist() {
        let bus = EventBus::new();
        let mut stream = bus.stream(EventType::LayerUnlocked, 4);

        let invoked = bus.emit(GameEvent::LayerUnlocked { layer: LayerId(5) });
        // The stream's internal subscription counts as a handler.
        assert_eq!(invoked, 1);

        let envelope = stream.recv().await.expect("stream should deliver");
        assert!(matches!(
            envelope.event,
            GameEvent::LayerUnlocked { layer: LayerId(5) }
        ));
    }
}
