//! Helpers shared by the integration tests.
#![allow(dead_code)]

use core::str::FromStr;
use zonewire::base::name::Name;
use zonewire::zone::Zone;

/// The zone used by most tests.
pub const EXAMPLE_ZONE: &str = "\
$TTL 3600
@           SOA ns1 hostmaster ( 2024010101 7200 3600 1209600 300 )
            NS ns1
            NS ns.other.example.
            MX 10 mail
ns1         A 192.0.2.53
            AAAA 2001:db8::53
mail        A 192.0.2.25
www         A 1.2.3.4
*           A 9.9.9.9
alias       CNAME www
loop1       CNAME loop2
loop2       CNAME loop1
sub         NS ns.sub
ns.sub      A 192.0.2.100
old         DNAME new.example.com.
x.new       A 192.0.2.77
";

pub fn init_logging() {
    // Initialize tracing based logging. Override with env var RUST_LOG, e.g.
    // RUST_LOG=trace.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .without_time()
        .try_init()
        .ok();
}

pub fn name(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

pub fn example_zone() -> Zone {
    Zone::from_zonefile(name("example.com."), EXAMPLE_ZONE).unwrap()
}
