pub mod hyperparamgrid;
