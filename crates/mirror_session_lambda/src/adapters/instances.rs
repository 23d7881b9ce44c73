/// Directory view of the compute control plane.
pub trait InstanceDirectory {
    /// Instance ids carrying the tag, either with the exact value or, when
    /// `value` is `None`, with any value of the key.
    fn instances_with_tag(&self, key: &str, value: Option<&str>) -> Result<Vec<String>, String>;

    /// Network interface ids of the instance in control-plane order, or
    /// `None` when the instance does not exist.
    fn network_interfaces(&self, instance_id: &str) -> Result<Option<Vec<String>>, String>;
}
