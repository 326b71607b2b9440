//! Chat request lifecycle.
//!
//! ```text
//! not yet --Request--> pending --Accept--> accepted --Finish--> finished
//!                              \-Decline-> declined
//! ```
//!
//! Every flow checks the transition before talking to the node, so an
//! illegal request (e.g. asking twice) never leaves the client.

use crate::error::{SessionError, SessionResult};
use crate::state::StateHandle;
use common::{Chat, ChatMessage, ChatRequestStatus};
use node_rpc::ChatApi;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTransition {
    Request,
    Accept,
    Decline,
    Finish,
}

impl std::fmt::Display for ChatTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChatTransition::Request => "request",
            ChatTransition::Accept => "accept",
            ChatTransition::Decline => "decline",
            ChatTransition::Finish => "finish",
        };
        f.write_str(s)
    }
}

pub fn next_status(
    from: ChatRequestStatus,
    transition: ChatTransition,
) -> SessionResult<ChatRequestStatus> {
    use ChatRequestStatus::*;
    use ChatTransition::*;

    match (from, transition) {
        (NotYet, Request) => Ok(Pending),
        (Pending, Accept) => Ok(Accepted),
        (Pending, Decline) => Ok(Declined),
        (Accepted, Finish) => Ok(Finished),
        _ => Err(SessionError::InvalidTransition { from, transition }),
    }
}

/// Buyer asks the provider of a listing to chat
pub async fn request_chat<A>(api: &A, state: &StateHandle, key: &str) -> SessionResult<i64>
where
    A: ChatApi + ?Sized,
{
    let (peer_id, cid, status) = state
        .read(|s| {
            s.listing(key)
                .map(|l| (l.peer_id.clone(), l.data_cid.clone(), l.request_chat_status))
        })
        .ok_or_else(|| SessionError::ListingNotFound(key.to_string()))?;
    next_status(status, ChatTransition::Request)?;

    let request = api.send_chat_request(&peer_id, &cid).await?;
    state.update(|s| s.mark_chat_requested(key, request.request_id))?;
    info!(%peer_id, %cid, request_id = request.request_id, "Chat requested");
    Ok(request.request_id)
}

/// Reload the requests other peers sent us
pub async fn refresh_incoming_requests<A>(api: &A, state: &StateHandle) -> SessionResult<usize>
where
    A: ChatApi + ?Sized,
{
    let requests = api.get_incoming_chat_requests().await?;
    let count = requests.len();
    state.update(|s| s.set_incoming_requests(requests));
    Ok(count)
}

fn incoming_status(
    state: &StateHandle,
    peer_id: &str,
    request_id: i64,
) -> SessionResult<ChatRequestStatus> {
    state
        .read(|s| s.incoming_request(peer_id, request_id).map(|r| r.status))
        .ok_or(SessionError::RequestNotFound(request_id))
}

/// Seller accepts a pending request; the node opens a chat
pub async fn accept_request<A>(
    api: &A,
    state: &StateHandle,
    peer_id: &str,
    request_id: i64,
) -> SessionResult<Chat>
where
    A: ChatApi + ?Sized,
{
    next_status(incoming_status(state, peer_id, request_id)?, ChatTransition::Accept)?;

    let chat = api.accept_chat_request(peer_id, request_id).await?;
    state.update(|s| {
        s.resolve_incoming_request(peer_id, request_id, ChatTransition::Accept, Some(chat.clone()))
    })?;
    info!(%peer_id, request_id, chat_id = chat.chat_id, "Chat request accepted");
    Ok(chat)
}

/// Seller declines a pending request; terminal for the buyer
pub async fn decline_request<A>(
    api: &A,
    state: &StateHandle,
    peer_id: &str,
    request_id: i64,
) -> SessionResult<()>
where
    A: ChatApi + ?Sized,
{
    next_status(incoming_status(state, peer_id, request_id)?, ChatTransition::Decline)?;

    api.decline_chat_request(peer_id, request_id).await?;
    state.update(|s| {
        s.resolve_incoming_request(peer_id, request_id, ChatTransition::Decline, None)
    })?;
    info!(%peer_id, request_id, "Chat request declined");
    Ok(())
}

/// Either party closes an accepted chat
pub async fn finish_chat<A>(
    api: &A,
    state: &StateHandle,
    peer_id: &str,
    chat_id: i64,
) -> SessionResult<Chat>
where
    A: ChatApi + ?Sized,
{
    let status = state
        .read(|s| s.chat_request_status(peer_id, chat_id))
        .ok_or(SessionError::ChatNotFound(chat_id))?;
    next_status(status, ChatTransition::Finish)?;

    let closed = api.close_chat(peer_id, chat_id).await?;
    state.update(|s| s.finish_chat(peer_id, closed.clone()))?;
    info!(%peer_id, chat_id, "Chat finished");
    state
        .read(|s| s.chat(peer_id, chat_id).cloned())
        .ok_or(SessionError::ChatNotFound(chat_id))
}

/// Post into an open chat; finished chats are read-only
pub async fn send_message<A>(
    api: &A,
    state: &StateHandle,
    peer_id: &str,
    chat_id: i64,
    text: &str,
) -> SessionResult<ChatMessage>
where
    A: ChatApi + ?Sized,
{
    if text.trim().is_empty() {
        return Err(SessionError::Validation("Message cannot be empty".to_string()));
    }
    let open = state
        .read(|s| s.chat(peer_id, chat_id).map(Chat::is_open))
        .ok_or(SessionError::ChatNotFound(chat_id))?;
    if !open {
        return Err(SessionError::ChatClosed(chat_id));
    }

    let message = api.send_message(peer_id, chat_id, text).await?;
    state.update(|s| s.push_message(peer_id, chat_id, message.clone()));
    Ok(message)
}

/// Reload a chat's transcript from the node
pub async fn load_messages<A>(
    api: &A,
    state: &StateHandle,
    peer_id: &str,
    chat_id: i64,
) -> SessionResult<Vec<ChatMessage>>
where
    A: ChatApi + ?Sized,
{
    if state.read(|s| s.chat(peer_id, chat_id).is_none()) {
        return Err(SessionError::ChatNotFound(chat_id));
    }
    let messages = api.get_messages(peer_id, chat_id).await?;
    state.update(|s| s.set_messages(peer_id, chat_id, messages.clone()));
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::{flatten_discovered, sync_listings, ListingView, SortOrder};
    use crate::testing::{discovered, incoming, outgoing, MockNode};
    use common::ChatStatus;

    const ALL: [ChatRequestStatus; 5] = [
        ChatRequestStatus::NotYet,
        ChatRequestStatus::Pending,
        ChatRequestStatus::Accepted,
        ChatRequestStatus::Declined,
        ChatRequestStatus::Finished,
    ];
    const TRANSITIONS: [ChatTransition; 4] = [
        ChatTransition::Request,
        ChatTransition::Accept,
        ChatTransition::Decline,
        ChatTransition::Finish,
    ];

    #[test]
    fn test_only_forward_transitions_exist() {
        for from in ALL {
            for transition in TRANSITIONS {
                if let Ok(to) = next_status(from, transition) {
                    assert!(to.rank() > from.rank(), "{from} -{transition}-> {to}");
                }
            }
        }
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        for from in [ChatRequestStatus::Declined, ChatRequestStatus::Finished] {
            for transition in TRANSITIONS {
                assert!(next_status(from, transition).is_err());
            }
        }
    }

    #[test]
    fn test_valid_transitions() {
        assert_eq!(
            next_status(ChatRequestStatus::NotYet, ChatTransition::Request).unwrap(),
            ChatRequestStatus::Pending
        );
        assert_eq!(
            next_status(ChatRequestStatus::Pending, ChatTransition::Decline).unwrap(),
            ChatRequestStatus::Declined
        );
        assert_eq!(
            next_status(ChatRequestStatus::Accepted, ChatTransition::Finish).unwrap(),
            ChatRequestStatus::Finished
        );
        let err = next_status(ChatRequestStatus::Pending, ChatTransition::Request).unwrap_err();
        assert_eq!(err.to_string(), "Cannot request a chat request that is pending");
    }

    #[tokio::test]
    async fn test_cheapest_provider_first_then_request_chat() {
        let node = MockNode::new();
        node.set_discovered(vec![discovered(
            "bafy1",
            "video.mp4",
            &[("peerA", 5.0), ("peerB", 3.0)],
        )]);
        let state = StateHandle::new();
        sync_listings(&node, &state).await.unwrap();

        let view = state.read(|s| ListingView::new("", SortOrder::LowestPrice).apply(s.listings()));
        assert_eq!(view[0].peer_id, "peerB");
        assert_eq!(view[0].price, 3.0);

        let request_id = request_chat(&node, &state, &view[0].key()).await.unwrap();

        state.read(|s| {
            let cheap = s.listing("peerB+bafy1").unwrap();
            assert_eq!(cheap.request_chat_status, ChatRequestStatus::Pending);
            assert_eq!(cheap.request_id, Some(request_id));
            let other = s.listing("peerA+bafy1").unwrap();
            assert_eq!(other.request_chat_status, ChatRequestStatus::NotYet);
            assert_eq!(other.request_id, None);
        });
    }

    #[tokio::test]
    async fn test_second_request_is_rejected_locally() {
        let node = MockNode::new();
        let state = StateHandle::new();
        state.update(|s| {
            s.set_listings(flatten_discovered(&[discovered(
                "bafy1",
                "a.txt",
                &[("peerA", 1.0)],
            )]))
        });

        request_chat(&node, &state, "peerA+bafy1").await.unwrap();
        let err = request_chat(&node, &state, "peerA+bafy1").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                from: ChatRequestStatus::Pending,
                transition: ChatTransition::Request
            }
        ));
        assert_eq!(node.count_calls("p2p_sendChatRequest"), 1);

        assert!(matches!(
            request_chat(&node, &state, "nobody+bafy1").await,
            Err(SessionError::ListingNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_seller_accepts_then_finishes() {
        let node = MockNode::new();
        node.set_incoming(vec![incoming(5, "buyer", "bafy1")]);
        let state = StateHandle::new();
        refresh_incoming_requests(&node, &state).await.unwrap();

        let chat = accept_request(&node, &state, "buyer", 5).await.unwrap();
        assert_eq!(chat.status, ChatStatus::Ongoing);
        assert_eq!(
            state.read(|s| s.incoming_request("buyer", 5).unwrap().status),
            ChatRequestStatus::Accepted
        );

        // accepting twice or declining after acceptance never reaches the node
        assert!(accept_request(&node, &state, "buyer", 5).await.is_err());
        assert!(decline_request(&node, &state, "buyer", 5).await.is_err());
        assert_eq!(node.count_calls("p2p_acceptChatRequest"), 1);
        assert_eq!(node.count_calls("p2p_declineChatRequest"), 0);

        send_message(&node, &state, "buyer", chat.chat_id, "price is firm")
            .await
            .unwrap();

        let closed = finish_chat(&node, &state, "buyer", chat.chat_id).await.unwrap();
        assert_eq!(closed.status, ChatStatus::Finished);
        assert_eq!(closed.messages.len(), 1);
        assert_eq!(
            state.read(|s| s.incoming_request("buyer", 5).unwrap().status),
            ChatRequestStatus::Finished
        );

        // finished chats stay readable but take no more messages or closes
        assert!(matches!(
            send_message(&node, &state, "buyer", chat.chat_id, "hello?").await,
            Err(SessionError::ChatClosed(_))
        ));
        assert!(finish_chat(&node, &state, "buyer", chat.chat_id).await.is_err());
        assert_eq!(node.count_calls("p2p_closeChat"), 1);

        // a stale node listing does not reopen it
        node.set_incoming(vec![incoming(5, "buyer", "bafy1")]);
        refresh_incoming_requests(&node, &state).await.unwrap();
        assert_eq!(
            state.read(|s| s.incoming_request("buyer", 5).unwrap().status),
            ChatRequestStatus::Finished
        );
    }

    #[tokio::test]
    async fn test_decline_is_terminal() {
        let node = MockNode::new();
        node.set_incoming(vec![incoming(6, "buyer", "bafy1")]);
        let state = StateHandle::new();
        refresh_incoming_requests(&node, &state).await.unwrap();

        decline_request(&node, &state, "buyer", 6).await.unwrap();
        assert_eq!(
            state.read(|s| s.incoming_request("buyer", 6).unwrap().status),
            ChatRequestStatus::Declined
        );
        assert!(accept_request(&node, &state, "buyer", 6).await.is_err());
        assert!(matches!(
            decline_request(&node, &state, "buyer", 99).await,
            Err(SessionError::RequestNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_buyer_finishes_chat_from_listing() {
        let node = MockNode::new();
        node.set_discovered(vec![discovered("bafy1", "a.txt", &[("seller", 1.0)])]);
        node.set_outgoing(vec![outgoing(
            3,
            "seller",
            "bafy1",
            ChatRequestStatus::Accepted,
            Some(8),
        )]);
        node.add_message(8, "seller", "welcome");
        let state = StateHandle::new();
        sync_listings(&node, &state).await.unwrap();
        crate::listings::refresh_chat_requests(&node, &state).await.unwrap();

        let messages = load_messages(&node, &state, "seller", 8).await.unwrap();
        assert_eq!(messages.len(), 1);

        finish_chat(&node, &state, "seller", 8).await.unwrap();
        state.read(|s| {
            let listing = s.listing("seller+bafy1").unwrap();
            assert_eq!(listing.request_chat_status, ChatRequestStatus::Finished);
            let chat = listing.chat.as_ref().unwrap();
            assert_eq!(chat.status, ChatStatus::Finished);
            assert_eq!(chat.messages.len(), 1);
        });
    }
}
