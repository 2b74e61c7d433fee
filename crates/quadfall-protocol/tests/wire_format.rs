//! Integration tests for the wire format as a client sees it.

use std::collections::BTreeMap;

use quadfall_protocol::{
    BinaryCodec, ClientMessage, ClientRequest, Codec, Direction, FRAME_HEADER_LEN, PlayerId,
    ServerMessage, Value, deserialize, frame_len, pack, serialize,
};

fn sample_state() -> Value {
    let board: Vec<Value> = (0..20)
        .map(|row| Value::from(vec![if row == 19 { 1i64 } else { 0 }; 10]))
        .collect();

    let mut piece = BTreeMap::new();
    piece.insert(
        "shape".to_owned(),
        Value::from(vec![Value::from(vec![1i64, 1, 1, 1])]),
    );
    piece.insert("block_type".to_owned(), Value::Int(1));

    [
        ("player_id", Value::from(PlayerId(1))),
        ("board", Value::from(board)),
        ("score", Value::Int(100)),
        ("nickname", Value::from("ünïcode")),
        ("ready", Value::Bool(false)),
        ("game_over", Value::Bool(false)),
        ("current_piece", Value::Map(piece)),
        ("position", Value::from(vec![0i64, 3])),
        ("ratio", Value::Float(-0.25)),
        ("nothing", Value::Null),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_nested_state_round_trips() {
    let v = sample_state();
    let bytes = serialize(&v).unwrap();
    assert_eq!(deserialize(&bytes).unwrap(), v);
}

#[test]
fn test_pack_then_read_frame_round_trips() {
    let v = sample_state();
    let framed = pack(&v).unwrap();

    let mut header = [0u8; FRAME_HEADER_LEN];
    header.copy_from_slice(&framed[..FRAME_HEADER_LEN]);
    let len = frame_len(header);

    assert_eq!(len, framed.len() - FRAME_HEADER_LEN);
    assert_eq!(deserialize(&framed[FRAME_HEADER_LEN..]).unwrap(), v);
}

#[test]
fn test_two_frames_back_to_back_split_cleanly() {
    let a = ClientMessage::Request(ClientRequest::Move(Direction::Left)).to_value();
    let b = ClientMessage::Request(ClientRequest::HardDrop).to_value();

    let mut stream = pack(&a).unwrap();
    stream.extend(pack(&b).unwrap());

    let mut decoded = Vec::new();
    let mut rest = stream.as_slice();
    while !rest.is_empty() {
        let mut header = [0u8; FRAME_HEADER_LEN];
        header.copy_from_slice(&rest[..FRAME_HEADER_LEN]);
        let len = frame_len(header);
        let body = &rest[FRAME_HEADER_LEN..FRAME_HEADER_LEN + len];
        decoded.push(ClientMessage::try_from(&deserialize(body).unwrap()).unwrap());
        rest = &rest[FRAME_HEADER_LEN + len..];
    }

    assert_eq!(
        decoded,
        vec![
            ClientMessage::Request(ClientRequest::Move(Direction::Left)),
            ClientMessage::Request(ClientRequest::HardDrop),
        ]
    );
}

#[test]
fn test_codec_trait_frame_matches_pack() {
    let v = ServerMessage::GameOver {
        player_id: PlayerId(4),
        score: 1200,
    }
    .to_value();
    assert_eq!(BinaryCodec.frame(&v).unwrap(), pack(&v).unwrap());
}

#[test]
fn test_truncated_frame_body_fails_to_decode() {
    let framed = pack(&sample_state()).unwrap();
    let body = &framed[FRAME_HEADER_LEN..framed.len() - 1];
    assert!(deserialize(body).is_err());
}
