//! Pre-built switch transcripts for testing.
//!
//! Captured-style CLI output of an ArubaOS-Switch, plus ready-made
//! `MockRunner` setups serving it.

use super::runner::MockRunner;
use crate::device::ReportKind;

/// `show interfaces 1/1-1/2` on a two-port switch: one busy uplink, one idle port.
pub const SWITCH_PORT_COUNTERS: &str = "\
 Status and Counters - Port Counters for port 1/1

  Name  : uplink-core
  MAC Address      : 001122-334455
  Link Status      : Up
  Port Enabled     : Yes
  Totals (Since boot or last clear) :
   Bytes Rx        : 2,854,717,268        Bytes Tx        : 3,215,430,156
   Unicast Rx      : 5,291,302            Unicast Tx      : 6,003,412
   Bcast/Mcast Rx  : 79,013               Bcast/Mcast Tx  : 1,287,734
  Errors (Since boot or last clear) :
   FCS Rx          : 0                    Drops Tx        : 12
   Alignment Rx    : 0                    Collisions Tx   : 0
   Runts Rx        : 0                    Late Colln Tx   : 0
   Giants Rx       : 0                    Excessive Colln : 0
   Total Rx Errors : 3                    Deferred Tx     : 0
  Others (Since boot or last clear) :
   Discard Rx      : 7                    Out Queue Len   : 0
   Unknown Protos  : 0
  Rates (5 minute weighted average) :
   Total Rx  (bps) : 14,080,088           Total Tx  (bps) : 15,592,184
   Unicast Rx (Pkts/sec) : 1,024          Unicast Tx (Pkts/sec) : 998
   B/Mcast Rx (Pkts/sec) : 12             B/Mcast Tx (Pkts/sec) : 40
   Utilization Rx  : 01.40 %              Utilization Tx  : 01.55 %

 Status and Counters - Port Counters for port 1/2

  Name  :
  MAC Address      : 001122-334456
  Link Status      : Down
  Port Enabled     : No
  Totals (Since boot or last clear) :
   Bytes Rx        : 0                    Bytes Tx        : 0
   Unicast Rx      : 0                    Unicast Tx      : 0
   Bcast/Mcast Rx  : 0                    Bcast/Mcast Tx  : 0
  Errors (Since boot or last clear) :
   FCS Rx          : 0                    Drops Tx        : 0
   Total Rx Errors : 0                    Deferred Tx     : 0
  Others (Since boot or last clear) :
   Discard Rx      : 0                    Out Queue Len   : 0
";

/// `show interface vlan` with two routed VLAN interfaces.
pub const SWITCH_VLAN_TRAFFIC: &str = "\
vlan1.1 (1) is up, line protocol is up
    Description: DEFAULT_VLAN
    Total 1,204 packets, 96,320 bytes input
    Total 2,301 packets, 184,080 bytes output
vlan10.1 (100) is up, line protocol is up
    Total 5 packets, 500 bytes input
    Total 5 packets, 600 bytes output
";

#[allow(dead_code)]
impl MockRunner {
    /// A reachable switch answering both reports with the transcripts above.
    pub fn typical_switch(host: &str) -> Self {
        let mut runner = Self::new();
        runner.add_response(
            host,
            &ReportKind::PortCounters.command(None),
            SWITCH_PORT_COUNTERS,
        );
        runner.add_response(
            host,
            &ReportKind::VlanTraffic.command(None),
            SWITCH_VLAN_TRAFFIC,
        );
        runner
    }

    /// Adds a second switch that is known but never answers.
    pub fn with_unreachable(mut self, host: &str) -> Self {
        self.add_failure(host, "connection refused");
        self
    }
}
