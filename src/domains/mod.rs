// 领域模块 - 按页面职责组织控制器状态
//
// 页面（文档、导航、面板、语音）、数据（绑定器与轮询）、
// 交互（表单与聊天）、系统（配置与日志）四个领域

pub mod data;
pub mod interaction;
pub mod page;
pub mod system;

pub use data::DataDomain;
pub use interaction::InteractionDomain;
pub use page::PageDomain;
pub use system::SystemDomain;
