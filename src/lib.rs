pub mod config;
pub mod control;
pub mod dijkstra;
pub mod error;
pub mod hello;
pub mod iface;
pub mod ids;
pub mod init;
pub mod lsa;
pub mod lsdb;
pub mod neighbor;
pub mod net_utils;
pub mod packet_loop;
pub mod route_install;
pub mod state;
pub mod tasks;
pub mod wire;
