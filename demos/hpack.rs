use algorithm::buf::{Binary, Bt};
use hpackparse::{Decoder, Encoder, HeaderField, Helper, HuffmanPolicy};

/// https://httpwg.org/specs/rfc7541.html#request.examples.with.huffman.coding, C.4
fn parse_header() {
    let mut decoder = Decoder::new();
    // C.4.1
    let buf = Helper::hexstr_to_vec("8286 8441 8cf1 e3c2 e5f2 3a6b a0ab 90f4 ff");
    let mut buf = Binary::copy_from_slice(&buf);
    let fields = decoder.decode(&mut buf).unwrap();
    for field in fields.iter() {
        println!(
            "{}: {}",
            String::from_utf8_lossy(field.name.chunk()),
            String::from_utf8_lossy(field.value.chunk())
        );
    }
    assert!(decoder.table().len() == 1);
    assert!(decoder.table().get_size() == 57);

    // C.4.2
    let buf = Helper::hexstr_to_vec("8286 84be 5886 a8eb 1064 9cbf");
    let mut buf = Binary::copy_from_slice(&buf);
    let fields = decoder.decode(&mut buf).unwrap();
    assert!(fields.len() == 5);
    assert!(fields[4].name.chunk() == b"cache-control");
    assert!(fields[4].value.chunk() == b"no-cache");
    assert!(decoder.table().len() == 2);

    // C.4.3
    let buf = Helper::hexstr_to_vec(
        "8287 85bf 4088 25a8 49e9 5ba9 7d7f 8925 a849 e95b b8e8 b4bf",
    );
    let mut buf = Binary::copy_from_slice(&buf);
    let fields = decoder.decode(&mut buf).unwrap();
    assert!(fields[4].name.chunk() == b"custom-key");
    assert!(fields[4].value.chunk() == b"custom-value");
    assert!(decoder.table().len() == 3);
    assert!(decoder.table().get_size() == 164);
}

fn encode_header() {
    let mut encoder = Encoder::new();
    encoder.set_huffman_policy(HuffmanPolicy::Always);
    let headers = vec![
        HeaderField::new(Binary::from_static(b":method"), Binary::from_static(b"GET")),
        HeaderField::new(Binary::from_static(b":scheme"), Binary::from_static(b"http")),
        HeaderField::new(Binary::from_static(b":path"), Binary::from_static(b"/")),
        HeaderField::new(
            Binary::from_static(b":authority"),
            Binary::from_static(b"www.example.com"),
        ),
    ];
    let buf = encoder.encode(headers.iter());
    println!("encoded {} octets", buf.remaining());
    assert!(
        buf.chunk() == &Helper::hexstr_to_vec("8286 8441 8cf1 e3c2 e5f2 3a6b a0ab 90f4 ff")[..]
    );
}

fn main() {
    parse_header();
    encode_header();
}
