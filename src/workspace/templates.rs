//! Literal file bodies: the three files a workspace starts with, and the
//! per-kind templates new files are seeded from.

use super::{Artifact, ArtifactId, ArtifactKind};

pub const MAIN_CONFIG_TEMPLATE: &str = r#"// New configuration file
zone "new.zone" {
    type master;
    file "/etc/bind/db.new";
};"#;

pub const FORWARD_ZONE_TEMPLATE: &str = r#"; Forward zone file
$TTL    604800
@       IN      SOA     ns1.example.com. admin.example.com. (
                              1         ; Serial
                         604800         ; Refresh
                          86400         ; Retry
                        2419200         ; Expire
                         604800 )       ; Negative Cache TTL
;
@       IN      NS      ns1.example.com.
@       IN      A       127.0.0.1"#;

pub const REVERSE_ZONE_TEMPLATE: &str = r#"; Reverse zone file
$TTL    604800
@       IN      SOA     ns1.example.com. admin.example.com. (
                              1         ; Serial
                         604800         ; Refresh
                          86400         ; Retry
                        2419200         ; Expire
                         604800 )       ; Negative Cache TTL
;
@       IN      NS      ns1.example.com.
1       IN      PTR     ns1.example.com."#;

pub const INITIAL_MAIN_CONFIG_ID: &str = "named-conf-local";
pub const INITIAL_FORWARD_ZONE_ID: &str = "db-forward";
pub const INITIAL_REVERSE_ZONE_ID: &str = "db-reverse";

const INITIAL_MAIN_CONFIG: &str = r#"//
// named.conf.local
//

zone "example.com" {
    type master;
    file "/etc/bind/db.example.com";
};

zone "1.168.192.in-addr.arpa" {
    type master;
    file "/etc/bind/db.192.168.1";
};"#;

const INITIAL_FORWARD_ZONE: &str = r#";
; BIND data file for example.com
;
$TTL    604800
@       IN      SOA     ns1.example.com. admin.example.com. (
                              2         ; Serial
                         604800         ; Refresh
                          86400         ; Retry
                        2419200         ; Expire
                         604800 )       ; Negative Cache TTL
;
@       IN      NS      ns1.example.com.
@       IN      A       192.168.1.10
ns1     IN      A       192.168.1.10
www     IN      CNAME   example.com."#;

const INITIAL_REVERSE_ZONE: &str = r#";
; BIND reverse data file for local loopback interface
;
$TTL    604800
@       IN      SOA     ns1.example.com. admin.example.com. (
                              1         ; Serial
                         604800         ; Refresh
                          86400         ; Retry
                        2419200         ; Expire
                         604800 )       ; Negative Cache TTL
;
@       IN      NS      ns1.example.com.
10      IN      PTR     ns1.example.com.
10      IN      PTR     example.com."#;

/// The files every new workspace starts with, in display order
pub fn initial_artifacts() -> Vec<Artifact> {
    vec![
        Artifact::new(
            ArtifactId::new(INITIAL_MAIN_CONFIG_ID),
            ArtifactKind::MainConfig,
            "named.conf.local",
            INITIAL_MAIN_CONFIG,
            "Main zone configuration file",
        ),
        Artifact::new(
            ArtifactId::new(INITIAL_FORWARD_ZONE_ID),
            ArtifactKind::ForwardZone,
            "db.example.com",
            INITIAL_FORWARD_ZONE,
            "Forward lookup zone file",
        ),
        Artifact::new(
            ArtifactId::new(INITIAL_REVERSE_ZONE_ID),
            ArtifactKind::ReverseZone,
            "db.192.168.1",
            INITIAL_REVERSE_ZONE,
            "Reverse lookup zone file",
        ),
    ]
}
