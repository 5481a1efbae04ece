//! Hand-off queue between the streaming worker and the UI loop.
//!
//! The producer side never blocks; the consumer either drains whatever is
//! available without waiting ([`RenderDrain::try_next`]) or, in headless
//! mode, awaits the next message ([`RenderDrain::recv`]). Every message is
//! tagged with the id of the stream that produced it so that late output of a
//! cancelled worker can be told apart from the current session.

use tokio::sync::mpsc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderMessage {
    /// One complete line of reply text, including its trailing newline.
    Chunk(String),
    /// The whole reply accumulated so far; closes the session.
    Complete(String),
    Error(String),
}

#[derive(Clone)]
pub struct RenderQueue {
    tx: mpsc::UnboundedSender<(RenderMessage, u64)>,
}

pub struct RenderDrain {
    rx: mpsc::UnboundedReceiver<(RenderMessage, u64)>,
}

pub fn render_queue() -> (RenderQueue, RenderDrain) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RenderQueue { tx }, RenderDrain { rx })
}

impl RenderQueue {
    /// Enqueues `message`; a closed consumer drops it silently.
    pub fn push(&self, stream_id: u64, message: RenderMessage) {
        let _ = self.tx.send((message, stream_id));
    }
}

impl RenderDrain {
    pub fn try_next(&mut self) -> Option<(RenderMessage, u64)> {
        self.rx.try_recv().ok()
    }

    pub async fn recv(&mut self) -> Option<(RenderMessage, u64)> {
        self.rx.recv().await
    }

    /// Drops everything currently queued and reports how many messages went.
    pub fn discard_pending(&mut self) -> usize {
        let mut discarded = 0;
        while self.rx.try_recv().is_ok() {
            discarded += 1;
        }
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_fifo_order_without_blocking() {
        let (queue, mut drain) = render_queue();
        assert!(drain.try_next().is_none());

        queue.push(1, RenderMessage::Chunk("a\n".into()));
        queue.push(1, RenderMessage::Chunk("b\n".into()));
        queue.push(1, RenderMessage::Complete("a\nb\n".into()));

        let drained: Vec<_> = std::iter::from_fn(|| drain.try_next()).collect();
        assert_eq!(
            drained,
            vec![
                (RenderMessage::Chunk("a\n".into()), 1),
                (RenderMessage::Chunk("b\n".into()), 1),
                (RenderMessage::Complete("a\nb\n".into()), 1),
            ]
        );
        assert!(drain.try_next().is_none());
    }

    #[test]
    fn discard_pending_empties_the_queue() {
        let (queue, mut drain) = render_queue();
        for i in 0..5 {
            queue.push(3, RenderMessage::Chunk(format!("{i}\n")));
        }
        assert_eq!(drain.discard_pending(), 5);
        assert!(drain.try_next().is_none());
    }

    #[test]
    fn push_after_consumer_dropped_is_ignored() {
        let (queue, drain) = render_queue();
        drop(drain);
        queue.push(1, RenderMessage::Error("gone".into()));
    }

    #[tokio::test]
    async fn producer_on_another_task_is_received_in_order() {
        let (queue, mut drain) = render_queue();
        let producer = tokio::spawn(async move {
            for i in 0..100 {
                queue.push(9, RenderMessage::Chunk(format!("{i}\n")));
            }
            queue.push(9, RenderMessage::Complete(String::new()));
        });

        let mut seen = 0;
        while let Some((message, id)) = drain.recv().await {
            assert_eq!(id, 9);
            match message {
                RenderMessage::Chunk(text) => {
                    assert_eq!(text, format!("{seen}\n"));
                    seen += 1;
                }
                RenderMessage::Complete(_) => break,
                RenderMessage::Error(e) => panic!("unexpected error {e}"),
            }
        }
        producer.await.expect("producer");
        assert_eq!(seen, 100);
    }
}
