use super::{CallSite, Lsda};
use crate::dwarf::parse::{Cursor, Encoding};
use crate::testutil::LsdaBuilder;
use crate::Error;

const REGION_START: usize = 0x4000;

#[test]
fn parse_header_with_type_table() {
    #[rustfmt::skip]
    let data = [
        0xff,             // lpstart omitted
        0x9b, 0x0d,       // ttype: indirect | pcrel | sdata4, offset 13
        0x01, 0x08,       // call sites: uleb128, 8 bytes
        0x00, 0x05, 0x09, 0x01,
        0x10, 0x02, 0x00, 0x00,
        0x01, 0x00,       // action table
    ];

    let lsda = unsafe { Lsda::parse(Cursor::new(&data), REGION_START) }.unwrap();
    assert_eq!(lsda.landing_pad_base, REGION_START);
    assert_eq!(lsda.ttype_encoding, Encoding(0x9b));
    assert_eq!(lsda.ttype_offset, Some(13));
    assert_eq!(lsda.call_site_encoding, Encoding(0x01));

    let call_sites = lsda.call_sites().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(
        call_sites,
        [
            CallSite {
                start: 0,
                length: 5,
                landing_pad: 9,
                action: 1
            },
            CallSite {
                start: 0x10,
                length: 2,
                landing_pad: 0,
                action: 0
            },
        ]
    );
    assert_eq!(lsda.landing_pad(&call_sites[0]), REGION_START + 9);

    let mut chain = lsda.actions(1);
    let action = chain.next().unwrap().unwrap();
    assert_eq!(action.type_filter, 1);
    assert_eq!(action.next, None);
    assert_eq!(chain.next(), None);
}

#[test]
fn explicit_landing_pad_base() {
    #[rustfmt::skip]
    let data = [
        0x03, 0x00, 0x20, 0x00, 0x00, // lpstart: udata4 0x2000
        0xff,
        0x03, 0x00,
    ];

    let lsda = unsafe { Lsda::parse(Cursor::new(&data), REGION_START) }.unwrap();
    assert_eq!(lsda.landing_pad_base, 0x2000);
    assert_eq!(lsda.ttype_offset, None);
    assert_eq!(lsda.call_sites().next(), None);
}

#[test]
fn udata4_call_sites() {
    #[rustfmt::skip]
    let data = [
        0xff, 0xff,
        0x03, 0x0d,
        0x04, 0x00, 0x00, 0x00,
        0x20, 0x00, 0x00, 0x00,
        0x40, 0x00, 0x00, 0x00,
        0x00,
    ];

    let lsda = unsafe { Lsda::parse(Cursor::new(&data), REGION_START) }.unwrap();
    let call_sites = lsda.call_sites().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(
        call_sites,
        [CallSite {
            start: 4,
            length: 0x20,
            landing_pad: 0x40,
            action: 0
        }]
    );
}

#[test]
fn action_chain() {
    let mut builder = LsdaBuilder::new();
    let first = builder.action(0, 1);
    builder.action(2, 0);
    let data = builder.call_site(0, 4, 8, first).build();

    let lsda = unsafe { Lsda::parse(Cursor::new(&data), REGION_START) }.unwrap();
    let chain = lsda.actions(first).collect::<Result<Vec<_>, _>>().unwrap();

    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].type_filter, 0);
    assert_eq!(chain[0].next, Some(chain[1].address));
    assert_eq!(chain[1].address, chain[0].address + 2);
    assert_eq!(chain[1].type_filter, 2);
    assert_eq!(chain[1].next, None);
}

#[test]
fn action_chain_cycle() {
    let mut builder = LsdaBuilder::new();
    let first = builder.action(0, 1);
    // The offset of the second record points back at the first one.
    builder.action(2, -3);
    let data = builder.call_site(0, 4, 8, first).build();

    let lsda = unsafe { Lsda::parse(Cursor::new(&data), REGION_START) }.unwrap();
    let mut chain = lsda.actions(first);

    let cleanup = chain.next().unwrap().unwrap();
    let catch = chain.next().unwrap().unwrap();
    assert_eq!(catch.next, Some(cleanup.address));
    assert_eq!(chain.next(), Some(Ok(cleanup)));
    assert_eq!(
        chain.next(),
        Some(Err(Error::ActionChainCycle { at: catch.address }))
    );
    assert_eq!(chain.next(), None);
}

#[test]
fn action_outside_table() {
    let data = LsdaBuilder::new().call_site(0, 4, 8, 5).build();
    let lsda = unsafe { Lsda::parse(Cursor::new(&data), REGION_START) }.unwrap();
    let end = data.as_ptr().addr() + data.len();
    let mut chain = lsda.actions(5);
    assert_eq!(
        chain.next(),
        Some(Err(Error::ActionOutOfBounds { at: end + 4 }))
    );
    assert_eq!(chain.next(), None);
}

#[test]
fn call_site_table_longer_than_data() {
    let data = [0xff, 0xff, 0x01, 0x10, 0x00];
    let err = unsafe { Lsda::parse(Cursor::new(&data), REGION_START) }.unwrap_err();
    assert!(matches!(err, Error::Truncated { wanted: 16, .. }), "{err:?}");
}

#[test]
fn truncated_call_site_entry() {
    let data = [0xff, 0xff, 0x03, 0x02, 0x00, 0x00];
    let lsda = unsafe { Lsda::parse(Cursor::new(&data), REGION_START) }.unwrap();
    let mut call_sites = lsda.call_sites();
    assert!(matches!(
        call_sites.next(),
        Some(Err(Error::Truncated { wanted: 4, .. }))
    ));
    assert_eq!(call_sites.next(), None);
}

#[test]
fn indirect_call_site_encoding() {
    let data = [0xff, 0xff, 0x83, 0x01, 0x00];
    let lsda = unsafe { Lsda::parse(Cursor::new(&data), REGION_START) }.unwrap();
    assert_eq!(
        lsda.call_sites().next(),
        Some(Err(Error::UnsupportedEncoding(0x83)))
    );
}
