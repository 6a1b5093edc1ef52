use std::io;
use std::path::PathBuf;

/// Looks up host network interfaces
pub trait InterfaceProbe: Send + Sync {
    fn exists(&self, ifname: &str) -> io::Result<bool>;
}

/// Checks interfaces through the sysfs net class directory
#[derive(Debug, Clone)]
pub struct SysfsProbe {
    root: PathBuf,
}

impl SysfsProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsProbe {
    fn default() -> Self {
        Self::new("/sys/class/net")
    }
}

impl InterfaceProbe for SysfsProbe {
    fn exists(&self, ifname: &str) -> io::Result<bool> {
        if ifname.is_empty() || ifname.contains('/') || ifname == "." || ifname == ".." {
            return Ok(false);
        }
        match self.root.join(ifname).symlink_metadata() {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
