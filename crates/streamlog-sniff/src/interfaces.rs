use pcap::Device;

/// A capture-capable network interface, reduced to what discovery needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    /// Empty when libpcap has no description for the device.
    pub description: String,
    /// Every assigned IPv4 and IPv6 address, in libpcap order.
    pub addresses: Vec<String>,
}

impl From<Device> for Interface {
    fn from(dev: Device) -> Self {
        Self {
            addresses: dev.addresses.iter().map(|a| a.addr.to_string()).collect(),
            description: dev.desc.unwrap_or_default(),
            name: dev.name,
        }
    }
}

/// All interfaces libpcap can see on this machine.
pub fn find_interfaces() -> Result<Vec<Interface>, pcap::Error> {
    find_interfaces_with(Device::list)
}

/// [`find_interfaces`] over an arbitrary device lister.
pub fn find_interfaces_with<F>(list: F) -> Result<Vec<Interface>, pcap::Error>
where
    F: FnOnce() -> Result<Vec<Device>, pcap::Error>,
{
    Ok(list()?.into_iter().map(Interface::from).collect())
}

/// Print every interface in a `name` / `description` / `addresses` block.
pub fn print_interfaces(ifaces: &[Interface]) {
    if ifaces.is_empty() {
        println!("no interfaces found (are you running with sufficient privileges?)");
        println!("Hint: run with sudo or set CAP_NET_RAW capability.");
        return;
    }

    println!("found {} interface(s):\n", ifaces.len());
    for iface in ifaces {
        println!("  name:        {}", iface.name);
        if !iface.description.is_empty() {
            println!("  description: {}", iface.description);
        }
        if !iface.addresses.is_empty() {
            println!("  addresses:   {}", iface.addresses.join(", "));
        }
        println!();
    }
    println!("Usage: streamlog-sniff -i <interface>");
}
