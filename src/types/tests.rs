use std::error::Error;

//------------ AddressFamily byte views --------------------------------------

#[test]
fn test_af_prefix_masks() -> Result<(), Box<dyn Error>> {
    use crate::AddressFamily;
    use crate::{IPv4, IPv6};
    use zerocopy::IntoBytes;

    assert_eq!(IPv4::prefix_mask(24).as_bytes(), &[255, 255, 255, 0]);
    assert_eq!(IPv4::prefix_mask(20).as_bytes(), &[255, 255, 240, 0]);
    assert_eq!(IPv4::prefix_mask(32).as_bytes(), &[255; 4]);
    assert_eq!(IPv4::prefix_mask(0).as_bytes(), &[0; 4]);

    let m = IPv6::prefix_mask(33);
    assert_eq!(
        m.as_bytes(),
        &[255, 255, 255, 255, 128, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(IPv6::prefix_mask(128).as_bytes(), &[255; 16]);

    Ok(())
}

#[test]
fn test_af_mapped_bytes() -> Result<(), Box<dyn Error>> {
    use crate::AddressFamily;
    use crate::{IPv4, IPv6};

    let v4 = IPv4::from_ipaddr("10.1.2.3".parse()?);
    assert_eq!(
        v4.into_mapped_bytes(),
        [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, 10, 1, 2, 3]
    );
    assert_eq!(v4.into_ipaddr(), "10.1.2.3".parse::<std::net::IpAddr>()?);

    let v6 = IPv6::from_ipaddr("2001:db8::68".parse()?);
    assert_eq!(
        v6.into_mapped_bytes(),
        [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x68]
    );

    Ok(())
}

//------------ Parsing -------------------------------------------------------

#[test]
fn test_parse_cidr() -> Result<(), Box<dyn Error>> {
    use crate::{AddressSpec, SpecKind};

    let spec = AddressSpec::parse("172.16.100.1/24")?;
    match spec.kind() {
        SpecKind::Cidr { address, prefix } => {
            assert_eq!(*address, "172.16.100.1".parse::<std::net::IpAddr>()?);
            assert_eq!(
                prefix.addr(),
                "172.16.100.0".parse::<std::net::IpAddr>()?
            );
            assert_eq!(prefix.len(), 24);
        }
        SpecKind::Range { .. } => panic!("expected a cidr"),
    }
    assert!(spec.is_ipv4());
    assert_eq!(spec.first(), "172.16.100.0".parse::<std::net::IpAddr>()?);
    assert_eq!(spec.last(), "172.16.100.255".parse::<std::net::IpAddr>()?);

    let spec = AddressSpec::parse("2001:db8::/32")?;
    assert!(spec.is_ipv6());
    assert_eq!(
        spec.last(),
        "2001:db8:ffff:ffff:ffff:ffff:ffff:ffff".parse::<std::net::IpAddr>()?
    );

    Ok(())
}

#[test]
fn test_parse_range() -> Result<(), Box<dyn Error>> {
    use crate::{AddressSpec, SpecKind};

    let spec = AddressSpec::parse("192.168.10.10-192.168.20.9")?;
    assert_eq!(
        *spec.kind(),
        SpecKind::Range {
            low: "192.168.10.10".parse()?,
            high: "192.168.20.9".parse()?,
        }
    );
    assert!(spec.mask().is_none());

    // whitespace around the parts is fine
    let spaced = AddressSpec::parse(" 192.168.10.10 - 192.168.20.9 ")?;
    assert_eq!(spec, spaced);

    Ok(())
}

#[test]
fn test_parse_invalid() {
    use crate::errors::AddressSpecError;
    use crate::AddressSpec;

    let cases = [
        ("", AddressSpecError::MalformedAddress),
        ("192.168.1", AddressSpecError::MalformedAddress),
        ("192.168.1.1/", AddressSpecError::PrefixLengthInvalid),
        ("192.168.1.1/33", AddressSpecError::PrefixLengthInvalid),
        ("2001:db8::/129", AddressSpecError::PrefixLengthInvalid),
        ("192.168.1.1/abc", AddressSpecError::PrefixLengthInvalid),
        ("192.168.1.1/0", AddressSpecError::ZeroPrefixLength),
        ("::/0", AddressSpecError::ZeroPrefixLength),
        ("1.1.1.1-2.2.2.2-3.3.3.3", AddressSpecError::MalformedRange),
        ("1.1.1.1-", AddressSpecError::MalformedAddress),
        ("1.1.1.1-::2", AddressSpecError::MixedFamilies),
        ("1.1.1.2-1.1.1.1", AddressSpecError::EmptyRange),
        ("1.1.1.1-1.1.1.1", AddressSpecError::EmptyRange),
        ("::2-::1", AddressSpecError::EmptyRange),
    ];

    for (text, err) in cases {
        assert_eq!(AddressSpec::parse(text), Err(err), "parsing {:?}", text);
    }
}

//------------ Cardinality ---------------------------------------------------

#[test]
fn test_cardinality() -> Result<(), Box<dyn Error>> {
    use crate::AddressSpec;
    use num_bigint::BigUint;

    let count = |s: &str| -> Result<BigUint, Box<dyn Error>> {
        Ok(AddressSpec::parse(s)?.cardinality().clone())
    };

    assert_eq!(count("192.168.100.0/24")?, BigUint::from(256_u32));
    assert_eq!(count("192.168.100.1-192.168.100.100")?, BigUint::from(100_u32));
    assert_eq!(count("192.168.100.1")?, BigUint::from(1_u32));
    assert_eq!(count("192.168.100.1/32")?, BigUint::from(1_u32));
    assert_eq!(count("2001:db8::68")?, BigUint::from(1_u32));
    assert_eq!(count("2001:db8::68/128")?, BigUint::from(1_u32));
    assert_eq!(count("10.0.0.0/20")?, BigUint::from(4096_u32));
    assert_eq!(count("10.0.0.0/8")?, BigUint::from(1_u32 << 24));
    assert_eq!(count("192.168.10.10-192.168.20.9")?, BigUint::from(2560_u32));
    assert_eq!(count("0.0.0.0-255.255.255.255")?, BigUint::from(1_u64 << 32));
    assert_eq!(count("::1-::2")?, BigUint::from(2_u32));

    // beyond any primitive integer
    assert_eq!(count("8000::/1")?, BigUint::from(1_u8) << 127_usize);
    assert_eq!(
        count("::-ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff")?,
        BigUint::from(1_u8) << 128_usize
    );

    Ok(())
}

#[test]
fn test_cardinality_ordering() -> Result<(), Box<dyn Error>> {
    use crate::AddressSpec;
    use std::cmp::Ordering;

    let wide = AddressSpec::parse("192.168.100.0/24")?;
    let narrow = AddressSpec::parse("192.168.100.1-192.168.100.100")?;
    assert_eq!(narrow.cmp_cardinality(&wide), Ordering::Less);
    assert_eq!(wide.cmp_cardinality(&narrow), Ordering::Greater);
    assert_eq!(wide.cmp_cardinality(&wide.clone()), Ordering::Equal);

    Ok(())
}

//------------ Canonical strings ---------------------------------------------

#[test]
fn test_canonical_string() -> Result<(), Box<dyn Error>> {
    use crate::AddressSpec;

    let canonical = |s: &str| -> Result<String, Box<dyn Error>> {
        Ok(AddressSpec::parse(s)?.to_string())
    };

    assert_eq!(canonical("192.168.100.2")?, "192.168.100.2");
    assert_eq!(canonical("192.168.100.2/32")?, "192.168.100.2");
    assert_eq!(canonical("172.16.100.1/24")?, "172.16.100.0/24");
    assert_eq!(canonical("2001:db8::68")?, "2001:db8::68");
    assert_eq!(canonical("2001:0db8:0::/48")?, "2001:db8::/48");
    assert_eq!(
        canonical("192.168.100.1-192.168.100.100")?,
        "192.168.100.1-192.168.100.100"
    );
    assert_eq!(canonical("::1-::ff")?, "::1-::ff");

    // the canonical string parses back into the same spec
    for s in ["10.0.0.0/8", "10.1.1.1-10.1.2.1", "2001:db8::1"] {
        let spec = AddressSpec::parse(s)?;
        assert_eq!(AddressSpec::parse(&spec.to_string())?, spec);
    }

    Ok(())
}

#[test]
fn test_serde_as_string() -> Result<(), Box<dyn Error>> {
    use crate::AddressSpec;

    let specs: Vec<AddressSpec> = serde_json::from_str(
        r#"["192.168.100.0/24", "192.168.100.1-192.168.100.100", "::1"]"#,
    )?;
    assert_eq!(specs.len(), 3);
    assert_eq!(
        serde_json::to_string(&specs)?,
        r#"["192.168.100.0/24","192.168.100.1-192.168.100.100","::1"]"#
    );

    let res = serde_json::from_str::<AddressSpec>(r#""10.0.0.0/0""#);
    assert!(res.is_err());

    Ok(())
}

#[test]
fn test_covers() -> Result<(), Box<dyn Error>> {
    use crate::AddressSpec;

    let spec = AddressSpec::parse("192.168.10.10-192.168.20.9")?;
    assert!(spec.covers("192.168.10.10".parse()?));
    assert!(spec.covers("192.168.15.0".parse()?));
    assert!(spec.covers("192.168.20.9".parse()?));
    assert!(!spec.covers("192.168.10.9".parse()?));
    assert!(!spec.covers("192.168.20.10".parse()?));
    // IPv4-mapped IPv6 counts as IPv4
    assert!(spec.covers("::ffff:192.168.15.0".parse()?));
    assert!(!spec.covers("2001:db8::1".parse()?));

    Ok(())
}
