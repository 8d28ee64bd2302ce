use super::*;

fn secs_since_unix_epoch() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|dur| dur.as_secs_f64())
        .unwrap_or(0.)
}
impl FileLogger {
    pub fn new(file: std::fs::File) -> Self {
        Self(file)
    }
    /// Creates (or truncates) the file at the given path.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        Ok(Self(std::fs::File::create(path)?))
    }
}
impl VecLogger {
    pub fn new() -> Self {
        Self(Default::default())
    }
    pub fn contents(&self) -> &[u8] {
        &self.0
    }
}
impl Default for VecLogger {
    fn default() -> Self {
        Self::new()
    }
}
/////////////////
impl Logger for DummyLogger {
    fn line_writer(&mut self) -> Option<&mut dyn std::io::Write> {
        None
    }
}

impl Logger for VecLogger {
    fn line_writer(&mut self) -> Option<&mut dyn std::io::Write> {
        let _ = write!(&mut self.0, "at {:.6} ", secs_since_unix_epoch());
        Some(self)
    }
}
impl Logger for FileLogger {
    fn line_writer(&mut self) -> Option<&mut dyn std::io::Write> {
        let _ = write!(&mut self.0, "at {:.6} ", secs_since_unix_epoch());
        Some(&mut self.0)
    }
}
///////////////////
impl Drop for VecLogger {
    fn drop(&mut self) {
        if self.0.is_empty() {
            return;
        }
        let stderr = std::io::stderr();
        let mut lock = stderr.lock();
        let _ = writeln!(lock, "--- DROP LOG DUMP ---");
        let _ = std::io::Write::write_all(&mut lock, self.0.as_slice());
    }
}
impl std::io::Write for VecLogger {
    fn flush(&mut self) -> Result<(), std::io::Error> {
        Ok(())
    }
    fn write(&mut self, data: &[u8]) -> Result<usize, std::io::Error> {
        self.0.extend_from_slice(data);
        Ok(data.len())
    }
}
