//! Decode fuzz target: feed arbitrary bytes to the record, triplet and
//! OID decoders. Decoding must not panic; every input either decodes or
//! returns a typed error.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let mut input = data;
    let mut reader = afpcodec::AfpReader::new(&mut input);
    while let Ok(Some(_)) = reader.read_record() {}

    let _ = afpcodec::GenericTriplet::decode_many(data, 0, None);
    let _ = afpcodec::Oid::from_bytes(data);
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = s.parse::<afpcodec::Oid>();
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
