//! Timeout-bounded single-frame receive.
//!
//! Registers one subscription, then races it against the socket's wait
//! time and the disconnect token. Whichever wins, the subscription is
//! removed before returning so a late frame can never land in a
//! registration nobody is waiting on.

use super::{DisconnectToken, WebSocket};
use crate::error::{Result, WsReaderError};
use crate::protocol::Frame;

/// Receive one frame, or `None` if the wait time elapses or the token fires.
///
/// Timeouts and cancellation are not errors; callers retry.
///
/// # Errors
///
/// Returns `ConnectionClosed` if the socket shut its frame hub down.
pub async fn receive_frame<S>(socket: &S, cancel: &DisconnectToken) -> Result<Option<Frame>>
where
    S: WebSocket + ?Sized,
{
    let mut subscription = socket.subscribe();

    let received = tokio::select! {
        biased;

        frame = subscription.recv() => Some(frame),
        _ = tokio::time::sleep(socket.wait_time()) => None,
        _ = cancel.cancelled() => None,
    };

    match received {
        Some(Some(frame)) => Ok(Some(frame)),
        Some(None) => Err(WsReaderError::ConnectionClosed),
        // A frame published between the timer firing and removal still wins.
        None => Ok(subscription.cancel()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Opcode;
    use crate::testing::ScriptedSocket;
    use std::time::Duration;

    #[tokio::test]
    async fn test_frame_arrives() {
        let socket = ScriptedSocket::new(vec![Frame::text("hi")]);
        let cancel = DisconnectToken::new();

        let frame = receive_frame(&socket, &cancel).await.unwrap().unwrap();
        assert_eq!(frame.opcode, Opcode::Text);
        assert_eq!(socket.listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_yields_none() {
        let socket = ScriptedSocket::new(Vec::new()).with_wait_time(Duration::from_secs(5));
        let cancel = DisconnectToken::new();

        let started = tokio::time::Instant::now();
        let frame = receive_frame(&socket, &cancel).await.unwrap();

        assert!(frame.is_none());
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(socket.listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_dangling_subscription_after_timeout() {
        let socket = ScriptedSocket::new(Vec::new());
        let cancel = DisconnectToken::new();

        assert!(receive_frame(&socket, &cancel).await.unwrap().is_none());

        // Nobody is registered, so a stray frame is not delivered anywhere
        assert_eq!(socket.events().publish(Frame::text("stray")), 0);

        socket.push(Frame::text("second"));
        let frame = receive_frame(&socket, &cancel).await.unwrap().unwrap();
        assert_eq!(frame.payload(), b"second");
        assert_eq!(socket.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_yields_none() {
        let socket = ScriptedSocket::new(Vec::new()).with_wait_time(Duration::from_secs(3600));
        let cancel = DisconnectToken::new();
        cancel.cancel();

        let frame = tokio::time::timeout(Duration::from_secs(1), receive_frame(&socket, &cancel))
            .await
            .expect("cancelled receive should return promptly")
            .unwrap();

        assert!(frame.is_none());
        assert_eq!(socket.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_ready_frame_beats_cancellation() {
        let socket = ScriptedSocket::new(vec![Frame::binary(vec![1u8, 2])]);
        let cancel = DisconnectToken::new();
        cancel.cancel();

        let frame = receive_frame(&socket, &cancel).await.unwrap();
        assert_eq!(frame.unwrap().payload(), &[1u8, 2]);
    }

    #[tokio::test]
    async fn test_shut_down_socket_is_an_error() {
        let socket = ScriptedSocket::new(Vec::new());
        socket.events().shutdown();
        let cancel = DisconnectToken::new();

        let result = receive_frame(&socket, &cancel).await;
        assert!(matches!(result, Err(WsReaderError::ConnectionClosed)));
    }
}
