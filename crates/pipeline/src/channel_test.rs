//! Message channel tests

use recon_protocol::Message;

use crate::message_channel;

#[tokio::test]
async fn test_fifo_order_preserved() {
    let (tx, mut rx) = message_channel();

    for i in 0..100u32 {
        tx.send(Message::new(1008, i)).unwrap();
    }

    for expected in 0..100u32 {
        let message = rx.recv().await.unwrap();
        assert_eq!(*message.downcast_ref::<u32>().unwrap(), expected);
    }
}

#[tokio::test]
async fn test_multi_producer_single_consumer() {
    let (tx, mut rx) = message_channel();

    let tx2 = tx.clone();
    tx.send(Message::new(1, "a")).unwrap();
    tx2.send(Message::new(2, "b")).unwrap();

    assert_eq!(rx.recv().await.unwrap().id(), 1);
    assert_eq!(rx.recv().await.unwrap().id(), 2);
}

#[tokio::test]
async fn test_drop_senders_closes_channel() {
    let (tx, mut rx) = message_channel();
    tx.send(Message::new(7, ())).unwrap();
    drop(tx);

    // Queued message still drains, then end-of-channel
    assert!(rx.recv().await.is_some());
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_explicit_close_rejects_new_sends() {
    let (tx, mut rx) = message_channel();
    tx.send(Message::new(7, ())).unwrap();

    rx.close();
    assert!(tx.send(Message::new(8, ())).is_err());
    assert!(tx.is_closed());

    // Already-queued messages still drain
    assert_eq!(rx.recv().await.unwrap().id(), 7);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_try_recv() {
    let (tx, mut rx) = message_channel();
    assert!(rx.try_recv().is_none());

    tx.send(Message::new(9, ())).unwrap();
    assert_eq!(rx.try_recv().unwrap().id(), 9);
}
